// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! Per-stack-frame mapping from a concrete address to the last writer
//! that wrote it during the current forward pass.

use std::collections::HashMap;

use crate::ir::{Address, StmtIdx};

#[derive(Clone, Debug, Default)]
pub struct AddrMap {
    addr_to_ref: HashMap<u64, (Address, StmtIdx)>,
}

impl AddrMap {
    pub fn new() -> Self {
        AddrMap::default()
    }

    /// Records a write to `addr` by `(run, stmt)`. Returns `true` iff
    /// the recorded writer actually changed, which the forward walker
    /// uses to decide whether to force a downstream re-analysis.
    pub fn record_write(&mut self, addr: u64, run: Address, stmt: StmtIdx) -> bool {
        let changed = self.addr_to_ref.get(&addr) != Some(&(run, stmt));
        self.addr_to_ref.insert(addr, (run, stmt));
        changed
    }

    pub fn lookup(&self, addr: u64) -> Option<(Address, StmtIdx)> {
        self.addr_to_ref.get(&addr).copied()
    }
}
