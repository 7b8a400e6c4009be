// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic and operational logging of the client goes through message types
//! defined here. Each message is a small struct with a `Display` implementation and a
//! [`StructuredLog`](messages::StructuredLog) implementation that emits it at the
//! right level with its fields attached.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::program` - graph construction and prototype events
//! * `messages::run` - engine instance lifecycle and streaming events
//!
//! The library never installs a subscriber; that is left to the application.
//!
//! # Usage
//!
//! ```rust
//! use rtbot_client::observability::messages::run::UnmappedColumn;
//! use rtbot_client::observability::messages::StructuredLog;
//!
//! UnmappedColumn { column: "price" }.log();
//! ```

pub mod messages;
