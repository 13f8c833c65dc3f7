// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

/// Tunables the distilled algorithm hard-codes as constants. Exposed as
/// a plain value the driver takes by reference, never read from the
/// environment or a config file.
#[derive(Clone, Debug)]
pub struct DdgConfig {
    /// Bounds loop-induced re-analysis of a single run.
    pub max_bbl_analyze_times: u32,
    /// Size of the stack window used by the call-stack frame heuristic.
    pub stack_window_bytes: u64,
}

impl Default for DdgConfig {
    fn default() -> Self {
        DdgConfig {
            max_bbl_analyze_times: 40,
            stack_window_bytes: 8192,
        }
    }
}
