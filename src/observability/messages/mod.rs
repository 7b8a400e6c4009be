// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `program` - operator, connection and prototype events on the graph model
//! * `run` - run session events: instance creation, streaming, teardown
//!
//! # Usage Pattern
//!
//! ```rust
//! use rtbot_client::observability::messages::run::InstanceCreated;
//!
//! let msg = InstanceCreated {
//!     program_id: "a1b2c3d4",
//!     operator_count: 3,
//! };
//!
//! tracing::info!("{}", msg);
//! ```

use tracing::Span;

pub mod program;
pub mod run;

/// A message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a tracing event.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
