// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while building, expanding or decoding a program graph.

use std::fmt;
use thiserror::Error;

/// Which reference to an operator could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorRole {
    /// The source side of a connection
    From,
    /// The target side of a connection
    To,
    /// An entry of the output mapping
    Output,
    /// The program's entry operator
    Entry,
}

impl fmt::Display for OperatorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self {
            OperatorRole::From => "from",
            OperatorRole::To => "to",
            OperatorRole::Output => "output",
            OperatorRole::Entry => "entry",
        };
        f.write_str(role)
    }
}

/// Errors that can occur while mutating or expanding a [`Program`](crate::program::Program).
///
/// Every variant is raised at the point of violation; nothing here is retried or
/// swallowed by the crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgramError {
    #[error("Operator with id '{id}' was already added to the program (maybe you are adding it twice?)")]
    DuplicateId { id: String },

    #[error("Operator '{id}' ({role}) hasn't been added to the program")]
    UnknownOperator { id: String, role: OperatorRole },

    #[error("There is already a connection from {from}:{from_port} to {to}:{to_port}")]
    DuplicateConnection {
        from: String,
        to: String,
        from_port: String,
        to_port: String,
    },

    #[error("Operator '{id}' was rejected by the validator: {message}")]
    InvalidOperator { id: String, message: String },

    #[error("Program was rejected by the validator: {message}")]
    InvalidProgram { message: String },

    #[error("Operator '{id}' has a parameter named '{parameter}', which is reserved for the operator itself")]
    ReservedParameter { id: String, parameter: String },

    #[error("Prototype '{id}' is not registered")]
    UnknownPrototype { id: String },

    #[error("Prototype '{id}' is missing required keys: {}", .missing.join(", "))]
    MalformedPrototype { id: String, missing: Vec<String> },

    #[error("Prototype '{id}' is invalid: {reason}")]
    InvalidPrototype { id: String, reason: String },

    #[error(
        "Prototype instance '{instance}' of '{prototype}' is missing required parameters: {}",
        .missing.join(", ")
    )]
    MissingParameters {
        instance: String,
        prototype: String,
        missing: Vec<String>,
    },

    #[error("Unknown parameter '{parameter}' in prototype instance '{instance}'")]
    UnknownParameter { instance: String, parameter: String },

    #[error("Parameter '{parameter}' of prototype instance '{instance}' must be a {expected}")]
    ParameterType {
        instance: String,
        parameter: String,
        expected: String,
    },

    #[error("Unknown parameter reference '{parameter}' while expanding '{instance}'")]
    UnresolvedParameter { instance: String, parameter: String },

    #[error("Prototype nesting is recursive: {}", .chain.join(" -> "))]
    RecursivePrototype { chain: Vec<String> },

    #[error("Invalid program document: {0}")]
    InvalidDocument(String),

    #[error("Failed to serialize program: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ProgramError {
    fn from(e: serde_json::Error) -> Self {
        ProgramError::Serialization(e.to_string())
    }
}
