// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

use thiserror::Error;

use crate::ir::Address;

/// The Fatal class from §7. Recoverable conditions never produce one of
/// these; they are logged through [`crate::log::DdgLog::warn`] and the
/// walker proceeds with the documented fallback.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DdgError {
    #[error("call stack is empty while locating the frame owning an address in run {run:#x}")]
    EmptyCallStack { run: Address },
    #[error("entry stack pointer could not be concretized")]
    EntrySpNotConcrete,
    #[error("statement index {index} out of range for run {run:#x} ({len} statements)")]
    StatementIndexOutOfRange {
        run: Address,
        index: usize,
        len: usize,
    },
    #[error("no run found for address {addr:#x}")]
    MissingEntryRun { addr: Address },
}
