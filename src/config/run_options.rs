// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Result collection mode of a run session.
///
/// # Variants
/// * `Aggregate` - Only the operator/port pairs named in the program's output mapping
/// * `Debug` - Every port of every operator, including operators nested in prototype instances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Aggregate,
    Debug,
}

impl RunMode {
    pub fn is_debug(self) -> bool {
        matches!(self, RunMode::Debug)
    }
}

/// Options for a [`Run`](crate::engine::Run) session.
///
/// All fields are optional in a profile and fall back to their defaults.
///
/// # Fields
/// * `mode` - Result collection mode (defaults to `aggregate`)
/// * `column_mapping` - Data column name -> engine input port
/// * `output_names` - Result column (`operator:port`) -> caller-chosen column name
/// * `batch_size` - Rows per step when running to completion (unbounded when absent)
///
/// # Example
/// ```toml
/// mode = "debug"
/// batch_size = 500
///
/// [column_mapping]
/// price = "i1"
///
/// [output_names]
/// "out1:o1" = "smoothed"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub mode: RunMode,
    pub column_mapping: BTreeMap<String, String>,
    pub output_names: BTreeMap<String, String>,
    pub batch_size: Option<usize>,
}

impl RunOptions {
    pub fn aggregate() -> Self {
        Self::default()
    }

    pub fn debug() -> Self {
        Self {
            mode: RunMode::Debug,
            ..Self::default()
        }
    }

    /// Route a data column to an engine input port.
    pub fn map_column(mut self, column: impl Into<String>, port: impl Into<String>) -> Self {
        self.column_mapping.insert(column.into(), port.into());
        self
    }

    /// Rename the result column `operator:port`.
    pub fn name_output(mut self, key: impl Into<String>, name: impl Into<String>) -> Self {
        self.output_names.insert(key.into(), name.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(content)?)
    }
}

/// Load run options from a TOML profile.
pub fn load_run_options<P: AsRef<Path>>(path: P) -> Result<RunOptions, LoadError> {
    let content = fs::read_to_string(path)?;
    RunOptions::from_toml_str(&content)
}
