// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod collector;
pub mod fragment;
pub mod run;
pub mod table;
#[cfg(test)]
pub mod sim_engine;

pub use collector::ColumnPlan;
pub use fragment::{parse_pass_output, Message, PassOutput};
pub use run::{Run, RunState, RunWarning, ScopedFuture};
pub use table::{Column, Table};
