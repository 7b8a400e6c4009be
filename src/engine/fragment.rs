// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Messages exchanged with the engine and the per-pass response fragment.

use crate::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A timestamped scalar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub time: u64,
    pub value: f64,
}

impl Message {
    pub fn new(time: u64, value: f64) -> Self {
        Self { time, value }
    }
}

/// What one processing pass emitted: operator id -> port id -> messages in
/// emission order.
pub type PassOutput = BTreeMap<String, BTreeMap<String, Vec<Message>>>;

/// Decode a pass result returned by the engine as JSON.
pub fn parse_pass_output(json: &str) -> Result<PassOutput, EngineError> {
    if json.trim().is_empty() {
        return Ok(PassOutput::new());
    }
    serde_json::from_str(json).map_err(|e| EngineError::Protocol(format!("unreadable pass output: {}", e)))
}

/// The last value emitted on every reported port, in key order.
pub fn last_values(output: &PassOutput) -> impl Iterator<Item = (&str, &str, f64)> {
    output.iter().flat_map(|(operator, ports)| {
        ports.iter().filter_map(move |(port, messages)| {
            messages
                .last()
                .map(|m| (operator.as_str(), port.as_str(), m.value))
        })
    })
}
