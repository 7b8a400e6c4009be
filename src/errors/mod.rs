// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod engine;
mod load;
mod program;
mod run;

pub use engine::EngineError;
pub use load::LoadError;
pub use program::{OperatorRole, ProgramError};
pub use run::{RunError, SchemaError};
