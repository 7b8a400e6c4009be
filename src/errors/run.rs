// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::Table;
use crate::errors::{EngineError, ProgramError};
use thiserror::Error;

/// The tabular data source does not have the shape a run needs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Data source has no '{0}' column")]
    MissingTimeColumn(String),

    #[error("Column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Row {row} has an invalid time value (times must be present, integral, non-negative and at most 2^53)")]
    InvalidTime { row: usize },

    #[error("Column '{0}' appears more than once")]
    DuplicateColumn(String),
}

/// Errors surfaced by a [`Run`](crate::engine::Run) session.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The engine returned a non-empty error while creating the instance.
    #[error("Engine refused to create program '{program_id}': {message}")]
    EngineCreation { program_id: String, message: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The engine failed partway through a step. `partial` holds the result rows of
    /// the rows processed before the failure; the session resumes after them.
    #[error("Engine failed after {} rows of the step: {source}", .partial.len())]
    StepFailed { partial: Table, source: EngineError },

    #[error(transparent)]
    Program(#[from] ProgramError),

    /// The session was released and cannot process further rows.
    #[error("Run session for program '{0}' was released")]
    SessionClosed(String),
}
