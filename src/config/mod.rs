// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod run_options;

pub mod consts;

pub use loader::{load_and_validate_program, load_program, parse_document, DocumentFormat};
pub use run_options::{load_run_options, RunMode, RunOptions};
