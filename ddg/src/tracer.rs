// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! Backward use–def traversal over the IR: traces a symbolic read/write
//! address back to its root producers.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::cfg::CfgProvider;
use crate::error::DdgError;
use crate::ir::{Address, RegOffset, Reference, Run, StmtIdx, TmpIdx};

/// Negative `addr` for sentinel sources, positive for real run
/// addresses; `stmt = -1` is always the sentinel's statement index.
pub type SourceAddr = i64;
pub type Source = (SourceAddr, StmtIdx);

struct TraceEntry {
    run_addr: Address,
    /// Exclusive upper bound to scan backward from; `-1` means "scan
    /// the whole run, from its last statement".
    start_stmt: StmtIdx,
    reg_deps: BTreeSet<RegOffset>,
    tmp_deps: BTreeSet<TmpIdx>,
}

/// The initial dependency seed for a reference used as a trace origin.
pub fn seed_deps(r: &Reference) -> (BTreeSet<RegOffset>, BTreeSet<TmpIdx>) {
    match r {
        Reference::MemWrite {
            addr_reg_deps,
            addr_tmp_deps,
            data_reg_deps,
            data_tmp_deps,
            ..
        } => (
            addr_reg_deps.union(data_reg_deps).cloned().collect(),
            addr_tmp_deps.union(data_tmp_deps).cloned().collect(),
        ),
        Reference::MemRead {
            addr_reg_deps,
            addr_tmp_deps,
            ..
        } => (addr_reg_deps.clone(), addr_tmp_deps.clone()),
        Reference::RegRead {
            data_reg_deps,
            data_tmp_deps,
            ..
        }
        | Reference::RegWrite {
            data_reg_deps,
            data_tmp_deps,
            ..
        }
        | Reference::TmpRead {
            data_reg_deps,
            data_tmp_deps,
            ..
        }
        | Reference::TmpWrite {
            data_reg_deps,
            data_tmp_deps,
            ..
        } => (data_reg_deps.clone(), data_tmp_deps.clone()),
    }
}

/// Inspects a statement's real ref against the outstanding dependency
/// sets, resolving and removing any it defines.
fn inspect_real_ref(
    r: &Reference,
    reg_deps: &mut BTreeSet<RegOffset>,
    tmp_deps: &mut BTreeSet<TmpIdx>,
    stmt_id: StmtIdx,
    reg_dep_to_stmt: &mut BTreeMap<RegOffset, StmtIdx>,
) {
    match r {
        Reference::RegWrite {
            offset,
            data_reg_deps,
            data_tmp_deps,
        } => {
            if reg_deps.remove(offset) {
                reg_dep_to_stmt.insert(*offset, stmt_id);
                reg_deps.extend(data_reg_deps.iter().copied());
                tmp_deps.extend(data_tmp_deps.iter().copied());
            }
        }
        Reference::TmpWrite {
            tmp,
            data_reg_deps,
            data_tmp_deps,
        } => {
            if tmp_deps.remove(tmp) {
                reg_deps.extend(data_reg_deps.iter().copied());
                tmp_deps.extend(data_tmp_deps.iter().copied());
            }
        }
        _ => {}
    }
}

/// Traces `seed`, a `MemRead` or `MemWrite` occurring at `(run_addr,
/// stmt_idx)`, back to its root producers. The coarse memoization keyed
/// by run address prevents exponential blow-up across re-entrant CFG
/// paths while the union re-enqueue on strict superset preserves
/// completeness when new dependencies appear.
///
/// Fatal per §7 if `stmt_idx` (or a re-enqueued predecessor's starting
/// index) names a statement outside the run's actual statement list —
/// an IR-adapter contract violation, not a condition the tracer can
/// route around.
pub fn trace_source(
    cfg: &dyn CfgProvider,
    run_addr: Address,
    stmt_idx: StmtIdx,
    seed: &Reference,
) -> Result<BTreeSet<Source>, DdgError> {
    let (reg0, tmp0) = seed_deps(seed);
    let mut traced: HashMap<Address, BTreeSet<RegOffset>> = HashMap::new();
    let mut sources: BTreeSet<Source> = BTreeSet::new();
    let mut queue: VecDeque<TraceEntry> = VecDeque::new();
    queue.push_back(TraceEntry {
        run_addr,
        start_stmt: stmt_idx,
        reg_deps: reg0,
        tmp_deps: tmp0,
    });

    while let Some(TraceEntry {
        run_addr,
        start_stmt,
        mut reg_deps,
        mut tmp_deps,
    }) = queue.pop_front()
    {
        traced
            .entry(run_addr)
            .and_modify(|s| *s = s.union(&reg_deps).cloned().collect())
            .or_insert_with(|| reg_deps.clone());

        let Some(run) = cfg.get_irsb(run_addr) else {
            continue;
        };

        let mut reg_dep_to_stmt: BTreeMap<RegOffset, StmtIdx> = BTreeMap::new();

        match run {
            Run::BasicBlock(bb) => {
                let from = if start_stmt < 0 {
                    bb.statements.len()
                } else {
                    let idx = start_stmt as usize;
                    if idx > bb.statements.len() {
                        return Err(DdgError::StatementIndexOutOfRange {
                            run: run_addr,
                            index: idx,
                            len: bb.statements.len(),
                        });
                    }
                    idx
                };
                for idx in (0..from).rev() {
                    if let Some(real_ref) = bb.statements[idx].real_ref() {
                        inspect_real_ref(
                            real_ref,
                            &mut reg_deps,
                            &mut tmp_deps,
                            idx as StmtIdx,
                            &mut reg_dep_to_stmt,
                        );
                    }
                    if reg_deps.is_empty() && tmp_deps.is_empty() {
                        break;
                    }
                }
            }
            Run::Summary(s) => {
                for r in s.refs.iter().rev() {
                    inspect_real_ref(r, &mut reg_deps, &mut tmp_deps, -1, &mut reg_dep_to_stmt);
                    if reg_deps.is_empty() && tmp_deps.is_empty() {
                        break;
                    }
                }
            }
        }

        for (_offset, stmt_id) in reg_dep_to_stmt {
            sources.insert((run_addr as SourceAddr, stmt_id));
        }

        if reg_deps.is_empty() {
            continue;
        }

        let preds = cfg.get_predecessors(run_addr);
        if preds.is_empty() {
            for offset in &reg_deps {
                sources.insert((-(*offset as SourceAddr), -1));
            }
            continue;
        }

        for p in preds {
            let enqueue = match traced.get(&p) {
                None => true,
                Some(existing) => !reg_deps.is_subset(existing),
            };
            if !enqueue {
                continue;
            }
            let merged = match traced.get(&p) {
                Some(existing) => existing.union(&reg_deps).cloned().collect(),
                None => reg_deps.clone(),
            };
            queue.push_back(TraceEntry {
                run_addr: p,
                start_stmt: -1,
                reg_deps: merged,
                tmp_deps: BTreeSet::new(),
            });
        }
    }

    Ok(sources)
}
