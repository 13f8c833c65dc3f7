// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! Logging sink. The core never calls a global logger directly; it is
//! handed a sink at construction time so a caller embedding the builder
//! in a larger tool can route diagnostics wherever it likes, and tests
//! can supply a capturing sink instead.

/// Recoverable conditions (§7) are reported here, never via an `Err`.
pub trait DdgLog {
    fn warn(&self, msg: &str);
    fn debug(&self, msg: &str);
}

/// Forwards to the `log` facade, matching how the rest of this
/// codebase's analysis crates report diagnostics.
#[derive(Default)]
pub struct LogCrateSink;

impl DdgLog for LogCrateSink {
    fn warn(&self, msg: &str) {
        log::warn!("{}", msg);
    }

    fn debug(&self, msg: &str) {
        log::debug!("{}", msg);
    }
}
