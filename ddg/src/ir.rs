// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! Uniform view over basic-block runs and summary runs: statements,
//! references, exits, re-execution. The rest of the crate never looks at
//! a concrete IR; it only ever sees these types.

use std::fmt::Debug;
use std::rc::Rc;

/// A run is identified by the address of its first instruction.
pub type Address = u64;
/// Index of a statement within a basic block. `-1` is the sentinel used
/// for summary runs, which have no statement structure.
pub type StmtIdx = i64;

pub type RegOffset = u32;
pub type TmpIdx = u32;

/// A symbolic expression as produced by the abstract-state/constraint
/// solver. The core never inspects an expression's structure, only
/// whether it can be reduced to one concrete value.
pub trait SymExpr: Debug {
    fn is_symbolic(&self) -> bool;
    fn concretize_one(&self) -> Option<u64>;
}

/// Reduces `addr` to a concrete value, or `None` if it is symbolic (or
/// the solver cannot pin it to a single value).
pub fn concretize(addr: &Rc<dyn SymExpr>) -> Option<u64> {
    if addr.is_symbolic() {
        None
    } else {
        addr.concretize_one()
    }
}

/// The abstract machine state carried along an exit edge.
pub trait AbstractState: Debug {
    fn sp_value(&self) -> Rc<dyn SymExpr>;
}

/// Re-executes a run in a fresh abstract state to refresh concrete
/// values along the current path. Pure w.r.t. the engine's abstract
/// domain: statement indices are stable across reanalyses of the same
/// run.
pub trait ReanalysisEngine {
    fn reanalyze(&self, run: &Run, incoming_state: Option<&Rc<dyn AbstractState>>) -> Run;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DepSet {
    pub reg: std::collections::BTreeSet<RegOffset>,
    pub tmp: std::collections::BTreeSet<TmpIdx>,
}

/// A read or write of a register, temporary, or memory location.
#[derive(Clone, Debug)]
pub enum Reference {
    RegRead {
        offset: RegOffset,
        data_reg_deps: std::collections::BTreeSet<RegOffset>,
        data_tmp_deps: std::collections::BTreeSet<TmpIdx>,
    },
    RegWrite {
        offset: RegOffset,
        data_reg_deps: std::collections::BTreeSet<RegOffset>,
        data_tmp_deps: std::collections::BTreeSet<TmpIdx>,
    },
    TmpRead {
        tmp: TmpIdx,
        data_reg_deps: std::collections::BTreeSet<RegOffset>,
        data_tmp_deps: std::collections::BTreeSet<TmpIdx>,
    },
    TmpWrite {
        tmp: TmpIdx,
        data_reg_deps: std::collections::BTreeSet<RegOffset>,
        data_tmp_deps: std::collections::BTreeSet<TmpIdx>,
    },
    MemRead {
        addr: Rc<dyn SymExpr>,
        addr_reg_deps: std::collections::BTreeSet<RegOffset>,
        addr_tmp_deps: std::collections::BTreeSet<TmpIdx>,
        data_reg_deps: std::collections::BTreeSet<RegOffset>,
        data_tmp_deps: std::collections::BTreeSet<TmpIdx>,
    },
    MemWrite {
        addr: Rc<dyn SymExpr>,
        addr_reg_deps: std::collections::BTreeSet<RegOffset>,
        addr_tmp_deps: std::collections::BTreeSet<TmpIdx>,
        data_reg_deps: std::collections::BTreeSet<RegOffset>,
        data_tmp_deps: std::collections::BTreeSet<TmpIdx>,
    },
}

impl Reference {
    pub fn is_mem_write(&self) -> bool {
        matches!(self, Reference::MemWrite { .. })
    }

    pub fn is_mem_read(&self) -> bool {
        matches!(self, Reference::MemRead { .. })
    }
}

/// An ordered list of references; by convention the *last* reference is
/// the statement's primary effect, preceding ones are sub-expressions
/// (notably `MemRead`s feeding the real ref's address or data).
#[derive(Clone, Debug, Default)]
pub struct Statement {
    pub refs: Vec<Reference>,
}

impl Statement {
    pub fn new(refs: Vec<Reference>) -> Self {
        Statement { refs }
    }

    pub fn real_ref(&self) -> Option<&Reference> {
        self.refs.last()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JumpKind {
    Call,
    Ret,
    Boring,
    Other(&'static str),
}

/// An outgoing abstract successor of a run.
#[derive(Clone, Debug)]
pub struct Exit {
    pub jumpkind: JumpKind,
    pub target: Rc<dyn SymExpr>,
    pub state: Option<Rc<dyn AbstractState>>,
}

impl Exit {
    pub fn concretize(&self) -> Option<Address> {
        concretize(&self.target)
    }
}

#[derive(Clone, Debug)]
pub struct BasicBlock {
    pub addr: Address,
    pub statements: Vec<Statement>,
    pub exits: Vec<Exit>,
}

#[derive(Clone, Debug)]
pub struct Summary {
    pub addr: Address,
    pub refs: Vec<Reference>,
    pub exits: Vec<Exit>,
}

/// A simulated run: either a basic block (a straight-line sequence of
/// IR statements) or a summary procedure modeling an external routine.
#[derive(Clone, Debug)]
pub enum Run {
    BasicBlock(BasicBlock),
    Summary(Summary),
}

impl Run {
    pub fn addr(&self) -> Address {
        match self {
            Run::BasicBlock(bb) => bb.addr,
            Run::Summary(s) => s.addr,
        }
    }

    pub fn statements(&self) -> Option<&[Statement]> {
        match self {
            Run::BasicBlock(bb) => Some(&bb.statements),
            Run::Summary(_) => None,
        }
    }

    pub fn exits(&self) -> &[Exit] {
        match self {
            Run::BasicBlock(bb) => &bb.exits,
            Run::Summary(s) => &s.exits,
        }
    }

    /// The flattened reference list of the run, in program order.
    pub fn refs(&self) -> Vec<&Reference> {
        match self {
            Run::BasicBlock(bb) => bb.statements.iter().flat_map(|s| s.refs.iter()).collect(),
            Run::Summary(s) => s.refs.iter().collect(),
        }
    }
}
