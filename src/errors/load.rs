// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ProgramError;
use thiserror::Error;

/// Errors that can occur while loading program documents or run profiles from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error("Unsupported file format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
}
