// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! The DDG store and the driver tying the forward walker and the
//! use–def tracer together into the two-pass inference engine.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use helper::set_map::SetMap;

use crate::call_stack::{CallStack, StackFrame, StackWindow};
use crate::cfg::CfgProvider;
use crate::config::DdgConfig;
use crate::error::DdgError;
use crate::ir::{AbstractState, Address, ReanalysisEngine, Reference, StmtIdx};
use crate::log::DdgLog;
use crate::tracer::{trace_source, Source};
use crate::walker::ForwardWalker;

/// `Map<reader_run, Map<reader_stmt, Set<(writer_run, writer_stmt)>>>`,
/// flattened to a single multimap keyed by the full reader tuple —
/// the same shape this codebase's own `DEP`/`KILL` multimaps use in
/// `post_analysis.rs`.
#[derive(Default)]
pub struct Ddg {
    edges: SetMap<(Address, StmtIdx), (Address, StmtIdx)>,
}

impl Ddg {
    pub fn new() -> Self {
        Ddg {
            edges: SetMap::new(),
        }
    }

    pub fn add_edge(&mut self, reader: (Address, StmtIdx), writer: (Address, StmtIdx)) {
        self.edges.insert(reader, writer);
    }

    pub fn writers_of(&self, reader_run: Address, reader_stmt: StmtIdx) -> BTreeSet<(Address, StmtIdx)> {
        self.edges
            .get(&(reader_run, reader_stmt))
            .cloned()
            .unwrap_or_default()
    }

    pub fn contains_edge(
        &self,
        reader: (Address, StmtIdx),
        writer: (Address, StmtIdx),
    ) -> bool {
        self.edges
            .get(&reader)
            .map(|writers| writers.contains(&writer))
            .unwrap_or(false)
    }
}

/// Runs the two-pass inference engine end to end: the forward CFG walk
/// (§4.D) populates direct edges and collects symbolic references,
/// then the backward use–def tracer (§4.F) resolves those and the
/// driver reconciles shared producers into over-approximated
/// may-alias edges (§4.G).
pub fn construct(
    cfg: &dyn CfgProvider,
    engine: &dyn ReanalysisEngine,
    log: &dyn DdgLog,
    config: &DdgConfig,
    entry_addr: Address,
    entry_state: Rc<dyn AbstractState>,
) -> Result<Ddg, DdgError> {
    let entry_sp = entry_state
        .sp_value()
        .concretize_one()
        .ok_or(DdgError::EntrySpNotConcrete)?;
    let window = StackWindow::new(entry_sp, config.stack_window_bytes);

    let outer_frame = StackFrame::new(None);
    let initial_stack: CallStack = vec![outer_frame];

    let mut walker = ForwardWalker::new(cfg, engine, log, config, window);
    walker.seed(entry_addr, Some(entry_state), initial_stack);
    walker.run()?;

    let (mut ddg, symbolic_ops) = walker.into_parts();

    let mut reads_by_source: BTreeMap<Source, BTreeSet<(Address, StmtIdx)>> = BTreeMap::new();
    let mut writes_by_source: BTreeMap<Source, BTreeSet<(Address, StmtIdx)>> = BTreeMap::new();

    for ((run_addr, stmt_idx, _pos), reference) in symbolic_ops.iter() {
        let sources = trace_source(cfg, *run_addr, *stmt_idx, reference)?;
        match reference {
            Reference::MemRead { .. } => {
                for src in sources {
                    reads_by_source
                        .entry(src)
                        .or_default()
                        .insert((*run_addr, *stmt_idx));
                }
            }
            Reference::MemWrite { .. } => {
                for src in sources {
                    writes_by_source
                        .entry(src)
                        .or_default()
                        .insert((*run_addr, *stmt_idx));
                }
            }
            _ => {
                log.debug(&format!(
                    "symbolic op at run {:#x} stmt {} is neither MemRead nor MemWrite, ignored",
                    run_addr, stmt_idx
                ));
            }
        }
    }

    for (src, writers) in writes_by_source.iter() {
        let Some(readers) = reads_by_source.get(src) else {
            continue;
        };
        for reader in readers {
            for writer in writers {
                ddg.add_edge(*reader, *writer);
            }
        }
    }

    Ok(ddg)
}
