// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

//! Stack of frames with initial stack-pointer bounds; selects the frame
//! that owns a given address. Absent true function identification, the
//! heuristic assigns a stack address to the most recently entered frame
//! whose initial SP is still above it, matching downward-growing
//! stacks.

use crate::addr_map::AddrMap;
use crate::error::DdgError;
use crate::ir::Address;

/// `initial_sp = None` marks the outermost frame, which captures all
/// non-stack (e.g. global) addresses and never gets popped.
#[derive(Clone, Debug)]
pub struct StackFrame {
    pub initial_sp: Option<u64>,
    pub addr_to_ref: AddrMap,
}

impl StackFrame {
    pub fn new(initial_sp: Option<u64>) -> Self {
        StackFrame {
            initial_sp,
            addr_to_ref: AddrMap::new(),
        }
    }
}

pub type CallStack = Vec<StackFrame>;

/// `[lbound, ubound]` assumed maximum stack window below the entry run's
/// concretized stack pointer.
#[derive(Clone, Debug)]
pub struct StackWindow {
    pub lbound: u64,
    pub ubound: u64,
}

impl StackWindow {
    pub fn new(entry_sp: u64, window_bytes: u64) -> Self {
        StackWindow {
            ubound: entry_sp,
            lbound: entry_sp.saturating_sub(window_bytes),
        }
    }

    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.lbound && addr <= self.ubound
    }
}

/// If `addr` falls outside the stack window, it is treated as a global
/// and routed to the outermost frame. Otherwise the innermost frame
/// whose `initial_sp` is still strictly above `addr` owns it.
pub fn find_frame_by_addr<'a>(
    stack: &'a mut CallStack,
    addr: u64,
    window: &StackWindow,
    run: Address,
) -> Result<&'a mut StackFrame, DdgError> {
    if stack.is_empty() {
        return Err(DdgError::EmptyCallStack { run });
    }
    if !window.contains(addr) {
        return Ok(&mut stack[0]);
    }
    let mut idx = 0usize;
    for (i, frame) in stack.iter().enumerate().rev() {
        if frame.initial_sp.is_none() || frame.initial_sp.unwrap() > addr {
            idx = i;
            break;
        }
    }
    Ok(&mut stack[idx])
}

/// Pushes a new frame on a `Call` jumpkind.
pub fn push_frame(stack: &mut CallStack, initial_sp: u64) {
    stack.push(StackFrame::new(Some(initial_sp)));
}

/// Pops the innermost frame on a `Ret` jumpkind. Returns `Err` if the
/// stack only has the outermost frame left, in which case the caller
/// should warn and leave the stack unchanged.
pub fn pop_frame(stack: &mut CallStack) -> Result<StackFrame, ()> {
    if stack.len() > 1 {
        Ok(stack.pop().unwrap())
    } else {
        Err(())
    }
}
