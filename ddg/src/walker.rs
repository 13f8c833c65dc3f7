// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! CFG traversal with re-scan limits, frame push/pop on call/return,
//! reference collection, edge emission for concrete reads.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use crate::call_stack::{find_frame_by_addr, pop_frame, push_frame, CallStack, StackWindow};
use crate::cfg::CfgProvider;
use crate::config::DdgConfig;
use crate::ddg::Ddg;
use crate::error::DdgError;
use crate::ir::{concretize, AbstractState, Address, JumpKind, ReanalysisEngine, Reference, Run, StmtIdx};
use crate::log::DdgLog;

/// Identifies a single reference for deduplication of the symbolic-op
/// collector: the run it occurred in, its statement index (`-1` for
/// summary runs), and its position within that statement's (or the
/// summary's) reference list.
pub type SymOpId = (Address, StmtIdx, usize);

/// An entry on the walker's pending queue. Owns a *copy* of the call
/// stack (copy-on-push semantics).
struct RunWrapper {
    run_addr: Address,
    new_state: Option<Rc<dyn AbstractState>>,
    call_stack: CallStack,
    reanalyze_successors: bool,
}

pub struct ForwardWalker<'a> {
    cfg: &'a dyn CfgProvider,
    engine: &'a dyn ReanalysisEngine,
    log: &'a dyn DdgLog,
    config: &'a DdgConfig,
    window: StackWindow,
    scanned: HashMap<Address, u32>,
    queued: HashSet<Address>,
    run_stack: Vec<RunWrapper>,
    ddg: Ddg,
    symbolic_ops: BTreeMap<SymOpId, Reference>,
}

impl<'a> ForwardWalker<'a> {
    pub fn new(
        cfg: &'a dyn CfgProvider,
        engine: &'a dyn ReanalysisEngine,
        log: &'a dyn DdgLog,
        config: &'a DdgConfig,
        window: StackWindow,
    ) -> Self {
        ForwardWalker {
            cfg,
            engine,
            log,
            config,
            window,
            scanned: HashMap::new(),
            queued: HashSet::new(),
            run_stack: Vec::new(),
            ddg: Ddg::new(),
            symbolic_ops: BTreeMap::new(),
        }
    }

    /// Seeds the walker with the entry run.
    pub fn seed(
        &mut self,
        entry_addr: Address,
        entry_state: Option<Rc<dyn AbstractState>>,
        call_stack: CallStack,
    ) {
        self.run_stack.push(RunWrapper {
            run_addr: entry_addr,
            new_state: entry_state,
            call_stack,
            reanalyze_successors: false,
        });
        self.queued.insert(entry_addr);
    }

    pub fn into_parts(self) -> (Ddg, BTreeMap<SymOpId, Reference>) {
        (self.ddg, self.symbolic_ops)
    }

    pub fn scanned_count(&self, addr: Address) -> u32 {
        *self.scanned.get(&addr).unwrap_or(&0)
    }

    /// Drains the pending queue (component D's main loop).
    pub fn run(&mut self) -> Result<(), DdgError> {
        while let Some(wrapper) = self.run_stack.pop() {
            self.queued.remove(&wrapper.run_addr);
            let count = self.scanned.entry(wrapper.run_addr).or_insert(0);
            if *count > self.config.max_bbl_analyze_times {
                self.log.debug(&format!(
                    "run {:#x} frozen (scanned {} > max {})",
                    wrapper.run_addr, count, self.config.max_bbl_analyze_times
                ));
                continue;
            }
            *count += 1;
            self.process_wrapper(wrapper)?;
        }
        Ok(())
    }

    fn process_wrapper(&mut self, mut wrapper: RunWrapper) -> Result<(), DdgError> {
        let template = self
            .cfg
            .get_irsb(wrapper.run_addr)
            .ok_or(DdgError::MissingEntryRun {
                addr: wrapper.run_addr,
            })?;
        let new_run = self.engine.reanalyze(template, wrapper.new_state.as_ref());

        // Sticky: a run downstream of a changed write must keep
        // propagating re-analysis even if it changes no write itself,
        // so a passthrough run ORs the incoming flag with its own.
        let mut reanalyze_successors = wrapper.reanalyze_successors;
        self.process_run_refs(&new_run, &mut wrapper.call_stack, &mut reanalyze_successors)?;
        wrapper.reanalyze_successors = reanalyze_successors;

        self.expand_successors(&new_run, &wrapper)
    }

    fn process_run_refs(
        &mut self,
        run: &Run,
        call_stack: &mut CallStack,
        reanalyze_successors: &mut bool,
    ) -> Result<(), DdgError> {
        match run {
            Run::BasicBlock(bb) => {
                for (stmt_idx, stmt) in bb.statements.iter().enumerate() {
                    self.process_statement(
                        bb.addr,
                        stmt_idx as StmtIdx,
                        &stmt.refs,
                        call_stack,
                        reanalyze_successors,
                    )?;
                }
            }
            Run::Summary(s) => {
                // Summary runs have no statement structure; the whole
                // flattened ref list is treated as a single pseudo-
                // statement under the `-1` sentinel (§9: do not
                // replicate the source's stray per-loop-index bug).
                self.process_statement(s.addr, -1, &s.refs, call_stack, reanalyze_successors)?;
            }
        }
        Ok(())
    }

    fn process_statement(
        &mut self,
        run_addr: Address,
        stmt_idx: StmtIdx,
        refs: &[Reference],
        call_stack: &mut CallStack,
        reanalyze_successors: &mut bool,
    ) -> Result<(), DdgError> {
        if refs.is_empty() {
            return Ok(());
        }

        let real_pos = refs.len() - 1;
        if let Reference::MemWrite { addr, .. } = &refs[real_pos] {
            match concretize(addr) {
                Some(concrete) => {
                    let frame = find_frame_by_addr(call_stack, concrete, &self.window, run_addr)?;
                    if frame.addr_to_ref.record_write(concrete, run_addr, stmt_idx) {
                        *reanalyze_successors = true;
                    }
                }
                None => {
                    self.insert_symbolic(run_addr, stmt_idx, real_pos, refs[real_pos].clone());
                }
            }
        }

        for (pos, r) in refs.iter().enumerate() {
            let Reference::MemRead { addr, .. } = r else {
                continue;
            };
            match concretize(addr) {
                Some(concrete) => {
                    let frame = find_frame_by_addr(call_stack, concrete, &self.window, run_addr)?;
                    if let Some(writer) = frame.addr_to_ref.lookup(concrete) {
                        self.ddg.add_edge((run_addr, stmt_idx), writer);
                        break;
                    }
                }
                None => {
                    self.insert_symbolic(run_addr, stmt_idx, pos, r.clone());
                }
            }
        }
        Ok(())
    }

    fn insert_symbolic(&mut self, run_addr: Address, stmt_idx: StmtIdx, pos: usize, r: Reference) {
        self.symbolic_ops.entry((run_addr, stmt_idx, pos)).or_insert(r);
    }

    fn expand_successors(&mut self, new_run: &Run, wrapper: &RunWrapper) -> Result<(), DdgError> {
        let successors = self.cfg.get_successors(wrapper.run_addr);
        let primary_jumpkind = new_run
            .exits()
            .first()
            .map(|e| e.jumpkind.clone())
            .unwrap_or(JumpKind::Boring);

        let mut seen_this_expansion: HashSet<Address> = HashSet::new();
        for succ_addr in successors {
            if !seen_this_expansion.insert(succ_addr) {
                continue;
            }
            if self.queued.contains(&succ_addr) {
                continue;
            }
            let scanned_count = *self.scanned.get(&succ_addr).unwrap_or(&0);
            let already_scanned = self.scanned.contains_key(&succ_addr);
            // Note the `<=`: a run that has been scanned exactly
            // `max_bbl_analyze_times` times may still be re-queued once
            // more. Combined with the pop-time `scanned[run] > MAX`
            // abort check, this lets `scanned[run]` reach MAX+1 before
            // the run is frozen, matching the documented re-scan cap
            // behavior rather than freezing one scan early.
            if already_scanned
                && !(wrapper.reanalyze_successors && scanned_count <= self.config.max_bbl_analyze_times)
            {
                continue;
            }

            let matching_exit = new_run
                .exits()
                .iter()
                .find(|e| e.concretize() == Some(succ_addr));
            let state = match matching_exit {
                Some(e) => e.state.clone(),
                None => {
                    self.log.warn(&format!(
                        "no matching exit for successor {:#x} of run {:#x}",
                        succ_addr, wrapper.run_addr
                    ));
                    None
                }
            };

            let mut call_stack = wrapper.call_stack.clone();
            self.apply_jumpkind_policy(&primary_jumpkind, &state, &mut call_stack, wrapper.run_addr);

            self.run_stack.push(RunWrapper {
                run_addr: succ_addr,
                new_state: state,
                call_stack,
                reanalyze_successors: wrapper.reanalyze_successors,
            });
            self.queued.insert(succ_addr);
        }
        Ok(())
    }

    fn apply_jumpkind_policy(
        &self,
        jumpkind: &JumpKind,
        state: &Option<Rc<dyn AbstractState>>,
        call_stack: &mut CallStack,
        run_addr: Address,
    ) {
        match jumpkind {
            JumpKind::Call => {
                let sp = state.as_ref().and_then(|s| s.sp_value().concretize_one());
                match sp {
                    Some(sp) => push_frame(call_stack, sp),
                    None => self.log.warn(&format!(
                        "call successor of run {:#x}: stack pointer not concrete, frame not pushed",
                        run_addr
                    )),
                }
            }
            JumpKind::Ret => {
                if pop_frame(call_stack).is_err() {
                    self.log.warn(&format!(
                        "return on call stack of depth 1 at run {:#x}",
                        run_addr
                    ));
                }
            }
            JumpKind::Boring | JumpKind::Other(_) => {}
        }
    }
}
