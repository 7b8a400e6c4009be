// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Verdict returned by the engine's validator, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }

    /// Decode the JSON verdict produced by the engine's `validate` bindings.
    ///
    /// An undecodable verdict is reported as an invalid result carrying the decode error.
    pub fn from_json(payload: &str) -> Self {
        serde_json::from_str(payload)
            .unwrap_or_else(|e| Self::rejected(format!("unreadable validation result: {}", e)))
    }

    /// The error message, or a generic one when the validator gave none.
    pub fn message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "rejected without a message".to_string())
    }
}

/// Semantic validation delegated to the engine.
///
/// The crate owns structural invariants (unique ids, resolvable connections) and asks
/// an implementation of this trait for everything else.
pub trait Validator: Send + Sync {
    /// Validate a complete serialized program.
    fn validate_program(&self, program_json: &str) -> Validation;

    /// Validate a single serialized primitive operator of the given type.
    fn validate_operator(&self, op_type: &str, operator_json: &str) -> Validation;
}

/// Accepts everything. Useful for building programs offline, without an engine at hand.
#[derive(Debug, Default, Clone, Copy)]
pub struct PermissiveValidator;

impl Validator for PermissiveValidator {
    fn validate_program(&self, _program_json: &str) -> Validation {
        Validation::ok()
    }

    fn validate_operator(&self, _op_type: &str, _operator_json: &str) -> Validation {
        Validation::ok()
    }
}
