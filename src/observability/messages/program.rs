// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph construction events.
//!
//! This module contains message types for logging events related to:
//! * Operators accepted into or rejected from a program
//! * Prototype registration and instantiation
//! * Whole-program validation verdicts

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// An operator was accepted into a program.
///
/// # Log Level
/// `debug!` - Construction detail
///
/// # Example
/// ```
/// use rtbot_client::observability::messages::program::OperatorAdded;
///
/// let msg = OperatorAdded {
///     program_id: "a1b2c3d4",
///     operator_id: "ma1",
///     operator_type: "MovingAverage",
/// };
///
/// assert_eq!(msg.to_string(), "Added operator 'ma1' (MovingAverage) to program 'a1b2c3d4'");
/// ```
pub struct OperatorAdded<'a> {
    pub program_id: &'a str,
    pub operator_id: &'a str,
    /// Primitive type, or the prototype id for an instance
    pub operator_type: &'a str,
}

impl Display for OperatorAdded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Added operator '{}' ({}) to program '{}'",
            self.operator_id, self.operator_type, self.program_id
        )
    }
}

impl StructuredLog for OperatorAdded<'_> {
    fn log(&self) {
        tracing::debug!(
            program_id = self.program_id,
            operator_id = self.operator_id,
            operator_type = self.operator_type,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "operator",
            span_name = name,
            program_id = self.program_id,
            operator_id = self.operator_id,
        )
    }
}

/// The validator refused an operator.
///
/// # Log Level
/// `error!` - The caller receives an `InvalidOperator` error
pub struct OperatorRejected<'a> {
    pub program_id: &'a str,
    pub operator_id: &'a str,
    pub reason: &'a str,
}

impl Display for OperatorRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Operator '{}' rejected for program '{}': {}",
            self.operator_id, self.program_id, self.reason
        )
    }
}

impl StructuredLog for OperatorRejected<'_> {
    fn log(&self) {
        tracing::error!(
            program_id = self.program_id,
            operator_id = self.operator_id,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "operator_rejected",
            span_name = name,
            program_id = self.program_id,
            operator_id = self.operator_id,
        )
    }
}

/// A prototype definition passed its checks and was registered.
///
/// # Log Level
/// `debug!`
pub struct PrototypeRegistered<'a> {
    pub prototype_id: &'a str,
    pub parameter_count: usize,
    pub operator_count: usize,
}

impl Display for PrototypeRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered prototype '{}' with {} parameters and {} operators",
            self.prototype_id, self.parameter_count, self.operator_count
        )
    }
}

impl StructuredLog for PrototypeRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            prototype_id = self.prototype_id,
            parameter_count = self.parameter_count,
            operator_count = self.operator_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "prototype",
            span_name = name,
            prototype_id = self.prototype_id,
        )
    }
}

/// A prototype instance was bound and added to a program.
///
/// # Log Level
/// `debug!`
pub struct PrototypeInstantiated<'a> {
    pub program_id: &'a str,
    pub instance_id: &'a str,
    pub prototype_id: &'a str,
    pub defaulted: usize,
}

impl Display for PrototypeInstantiated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Instantiated prototype '{}' as '{}' in program '{}' ({} defaulted parameters)",
            self.prototype_id, self.instance_id, self.program_id, self.defaulted
        )
    }
}

impl StructuredLog for PrototypeInstantiated<'_> {
    fn log(&self) {
        tracing::debug!(
            program_id = self.program_id,
            instance_id = self.instance_id,
            prototype_id = self.prototype_id,
            defaulted = self.defaulted,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "instance",
            span_name = name,
            program_id = self.program_id,
            instance_id = self.instance_id,
        )
    }
}

/// The validator refused a whole program on parse.
///
/// # Log Level
/// `error!`
pub struct ProgramRejected<'a> {
    pub program_id: &'a str,
    pub reason: &'a str,
}

impl Display for ProgramRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Program '{}' rejected: {}", self.program_id, self.reason)
    }
}

impl StructuredLog for ProgramRejected<'_> {
    fn log(&self) {
        tracing::error!(program_id = self.program_id, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("program_rejected", span_name = name, program_id = self.program_id)
    }
}
