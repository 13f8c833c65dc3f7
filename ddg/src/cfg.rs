// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! The narrow CFG collaborator trait this crate needs, plus an
//! in-memory implementation for tests. CFG construction, disassembly,
//! and lifting to IR are out of scope (§1/§6); a real caller plugs in
//! its own disassembler/lifter behind [`CfgProvider`].

use std::collections::HashMap;

use petgraph::prelude::DiGraphMap;
use petgraph::Direction;

use crate::ir::{Address, Run};

/// Nodes are identified by [`Address`], sidestepping the
/// reference-identity/lifetime questions the distilled spec leaves
/// implicit.
pub trait CfgProvider {
    fn get_irsb(&self, addr: Address) -> Option<&Run>;
    fn get_predecessors(&self, addr: Address) -> Vec<Address>;
    fn get_successors(&self, addr: Address) -> Vec<Address>;
}

/// A CFG backed by a `petgraph::DiGraphMap`, in the same shape as
/// `bda::cfg::CFG`'s procedure wrapper. Mainly useful for tests and
/// small standalone tools; a production caller typically backs
/// [`CfgProvider`] with a disassembler's own CFG structure.
#[derive(Default)]
pub struct MemoryCfg {
    graph: DiGraphMap<Address, ()>,
    runs: HashMap<Address, Run>,
}

impl MemoryCfg {
    pub fn new() -> Self {
        MemoryCfg {
            graph: DiGraphMap::new(),
            runs: HashMap::new(),
        }
    }

    pub fn add_run(&mut self, run: Run) {
        let addr = run.addr();
        self.graph.add_node(addr);
        self.runs.insert(addr, run);
    }

    pub fn add_edge(&mut self, from: Address, to: Address) {
        self.graph.add_edge(from, to, ());
    }
}

impl CfgProvider for MemoryCfg {
    fn get_irsb(&self, addr: Address) -> Option<&Run> {
        self.runs.get(&addr)
    }

    fn get_predecessors(&self, addr: Address) -> Vec<Address> {
        self.graph
            .neighbors_directed(addr, Direction::Incoming)
            .collect()
    }

    fn get_successors(&self, addr: Address) -> Vec<Address> {
        self.graph
            .neighbors_directed(addr, Direction::Outgoing)
            .collect()
    }
}
