// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_FROM_PORT, DEFAULT_TO_PORT};
use serde::{Deserialize, Serialize};

fn default_from_port() -> String {
    DEFAULT_FROM_PORT.to_string()
}

fn default_to_port() -> String {
    DEFAULT_TO_PORT.to_string()
}

/// A directed edge from an output port of one operator to an input port of another.
///
/// Ports default to `o1` and `i1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub from: String,
    pub to: String,
    #[serde(default = "default_from_port")]
    pub from_port: String,
    #[serde(default = "default_to_port")]
    pub to_port: String,
}

impl Connection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            from_port: default_from_port(),
            to_port: default_to_port(),
        }
    }

    pub fn from_port(mut self, port: impl Into<String>) -> Self {
        self.from_port = port.into();
        self
    }

    pub fn to_port(mut self, port: impl Into<String>) -> Self {
        self.to_port = port.into();
        self
    }
}
