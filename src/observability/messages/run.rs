// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for run session events.
//!
//! This module contains message types for logging events related to:
//! * Engine instance lifecycle (create, release, leak)
//! * Column routing and port acceptance warnings
//! * Step progress and per-row details

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// The engine accepted the program and created a live instance.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use rtbot_client::observability::messages::run::InstanceCreated;
///
/// let msg = InstanceCreated {
///     program_id: "a1b2c3d4",
///     operator_count: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct InstanceCreated<'a> {
    pub program_id: &'a str,
    pub operator_count: usize,
}

impl Display for InstanceCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Created engine instance '{}' with {} operators",
            self.program_id, self.operator_count
        )
    }
}

impl StructuredLog for InstanceCreated<'_> {
    fn log(&self) {
        tracing::info!(
            program_id = self.program_id,
            operator_count = self.operator_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "instance",
            span_name = name,
            program_id = self.program_id,
            operator_count = self.operator_count,
        )
    }
}

/// The engine refused to create an instance.
///
/// # Log Level
/// `error!` - The step fails with `EngineCreation`
pub struct InstanceCreationFailed<'a> {
    pub program_id: &'a str,
    pub reason: &'a str,
}

impl Display for InstanceCreationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Engine refused to create instance '{}': {}",
            self.program_id, self.reason
        )
    }
}

impl StructuredLog for InstanceCreationFailed<'_> {
    fn log(&self) {
        tracing::error!(program_id = self.program_id, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("instance_creation", span_name = name, program_id = self.program_id)
    }
}

/// The engine instance was deleted.
///
/// # Log Level
/// `info!`
pub struct InstanceReleased<'a> {
    pub program_id: &'a str,
    pub rows_processed: usize,
}

impl Display for InstanceReleased<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Released engine instance '{}' after {} rows",
            self.program_id, self.rows_processed
        )
    }
}

impl StructuredLog for InstanceReleased<'_> {
    fn log(&self) {
        tracing::info!(
            program_id = self.program_id,
            rows_processed = self.rows_processed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("release", span_name = name, program_id = self.program_id)
    }
}

/// Deleting the instance failed; the session is closed regardless.
///
/// # Log Level
/// `warn!`
pub struct ReleaseFailed<'a> {
    pub program_id: &'a str,
    pub reason: &'a str,
}

impl Display for ReleaseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to delete engine instance '{}': {}",
            self.program_id, self.reason
        )
    }
}

impl StructuredLog for ReleaseFailed<'_> {
    fn log(&self) {
        tracing::warn!(program_id = self.program_id, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("release_failed", span_name = name, program_id = self.program_id)
    }
}

/// The data source is exhausted and the aggregate session tore its instance down.
///
/// # Log Level
/// `info!`
pub struct SessionDrained<'a> {
    pub program_id: &'a str,
    pub rows_processed: usize,
}

impl Display for SessionDrained<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Session for '{}' drained after {} rows",
            self.program_id, self.rows_processed
        )
    }
}

impl StructuredLog for SessionDrained<'_> {
    fn log(&self) {
        tracing::info!(
            program_id = self.program_id,
            rows_processed = self.rows_processed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("drain", span_name = name, program_id = self.program_id)
    }
}

/// An input column has no explicit port mapping and is routed to the port of the
/// same name.
///
/// # Log Level
/// `warn!`
pub struct UnmappedColumn<'a> {
    pub column: &'a str,
}

impl Display for UnmappedColumn<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Column '{}' has no port mapping; sending it to port '{}'",
            self.column, self.column
        )
    }
}

impl StructuredLog for UnmappedColumn<'_> {
    fn log(&self) {
        tracing::warn!(column = self.column, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("unmapped_column", span_name = name, column = self.column)
    }
}

/// A routed port is not among the entry ports the engine reports.
///
/// # Log Level
/// `warn!`
pub struct PortNotAccepted<'a> {
    pub program_id: &'a str,
    pub port: &'a str,
}

impl Display for PortNotAccepted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Program '{}' does not list '{}' as an entry port",
            self.program_id, self.port
        )
    }
}

impl StructuredLog for PortNotAccepted<'_> {
    fn log(&self) {
        tracing::warn!(program_id = self.program_id, port = self.port, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "port_not_accepted",
            span_name = name,
            program_id = self.program_id,
            port = self.port,
        )
    }
}

/// A step is about to push rows through the engine.
///
/// # Log Level
/// `info!` span around the step
pub struct StepStarted<'a> {
    pub program_id: &'a str,
    pub from_row: usize,
    pub rows: usize,
}

impl Display for StepStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stepping '{}' over {} rows from row {}",
            self.program_id, self.rows, self.from_row
        )
    }
}

impl StructuredLog for StepStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            program_id = self.program_id,
            from_row = self.from_row,
            rows = self.rows,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "step",
            span_name = name,
            program_id = self.program_id,
            from_row = self.from_row,
            rows = self.rows,
        )
    }
}

/// A step finished.
///
/// # Log Level
/// `debug!`
pub struct StepCompleted<'a> {
    pub program_id: &'a str,
    pub rows: usize,
    pub current_index: usize,
}

impl Display for StepCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processed {} rows of '{}', now at row {}",
            self.rows, self.program_id, self.current_index
        )
    }
}

impl StructuredLog for StepCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            program_id = self.program_id,
            rows = self.rows,
            current_index = self.current_index,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("step_completed", span_name = name, program_id = self.program_id)
    }
}

/// A cell of the input table is missing and nothing was sent for it.
///
/// # Log Level
/// `debug!`
pub struct MissingValue<'a> {
    pub column: &'a str,
    pub row: usize,
}

impl Display for MissingValue<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping missing value in column '{}' at row {}", self.column, self.row)
    }
}

impl StructuredLog for MissingValue<'_> {
    fn log(&self) {
        tracing::debug!(column = self.column, row = self.row, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("missing_value", span_name = name, column = self.column)
    }
}

/// A session was dropped while its engine instance was still alive.
///
/// # Log Level
/// `warn!`
pub struct InstanceLeaked<'a> {
    pub program_id: &'a str,
    pub cleanup_scheduled: bool,
}

impl Display for InstanceLeaked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.cleanup_scheduled {
            write!(
                f,
                "Run for '{}' dropped without release; scheduled a background delete",
                self.program_id
            )
        } else {
            write!(
                f,
                "Run for '{}' dropped without release and no runtime is available; instance leaked",
                self.program_id
            )
        }
    }
}

impl StructuredLog for InstanceLeaked<'_> {
    fn log(&self) {
        tracing::warn!(
            program_id = self.program_id,
            cleanup_scheduled = self.cleanup_scheduled,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("instance_leaked", span_name = name, program_id = self.program_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_messages() {
        let created = InstanceCreated {
            program_id: "abc",
            operator_count: 3,
        };
        assert_eq!(created.to_string(), "Created engine instance 'abc' with 3 operators");

        let drained = SessionDrained {
            program_id: "abc",
            rows_processed: 10,
        };
        assert_eq!(drained.to_string(), "Session for 'abc' drained after 10 rows");
    }

    #[test]
    fn test_routing_warnings() {
        let unmapped = UnmappedColumn { column: "price" };
        assert_eq!(
            unmapped.to_string(),
            "Column 'price' has no port mapping; sending it to port 'price'"
        );

        let port = PortNotAccepted {
            program_id: "abc",
            port: "i9",
        };
        assert!(port.to_string().contains("'i9'"));
    }

    #[test]
    fn test_leak_message_variants() {
        let scheduled = InstanceLeaked {
            program_id: "abc",
            cleanup_scheduled: true,
        };
        let leaked = InstanceLeaked {
            program_id: "abc",
            cleanup_scheduled: false,
        };
        assert!(scheduled.to_string().contains("scheduled"));
        assert!(leaked.to_string().contains("leaked"));
    }
}
