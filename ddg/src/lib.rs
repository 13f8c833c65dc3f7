// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

pub mod addr_map;
pub mod call_stack;
pub mod cfg;
pub mod config;
mod ddg;
pub mod error;
pub mod ir;
pub mod log;
pub mod tracer;
pub mod walker;

pub use crate::config::DdgConfig;
pub use crate::ddg::{construct, Ddg};
pub use crate::error::DdgError;
pub use crate::log::{DdgLog, LogCrateSink};

#[cfg(test)]
mod test_addr_map;
#[cfg(test)]
mod test_call_stack;
#[cfg(test)]
mod test_cfg;
#[cfg(test)]
mod test_walker;
