// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::LoadError;
use crate::program::{IdGenerator, Program};
use crate::traits::Validator;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// On-disk encodings of a program document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(DocumentFormat::Json),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parse document text in the given format into a JSON value tree.
///
/// YAML documents use the same field names as the JSON wire form.
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<Value, LoadError> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_str(content)?),
        DocumentFormat::Yaml => Ok(serde_yaml::from_str(content)?),
    }
}

/// Load a program document from a `.json`, `.yaml` or `.yml` file.
///
/// The document is replayed through the program's mutation methods, so every
/// structural check applies. The validator is consulted per operator only.
pub fn load_program<P: AsRef<Path>>(
    path: P,
    ids: &dyn IdGenerator,
    validator: Arc<dyn Validator>,
) -> Result<Program, LoadError> {
    let path = path.as_ref();
    let format = DocumentFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let value = parse_document(&content, format)?;
    Ok(Program::from_value(value, ids, validator)?)
}

/// Load a program document and have the validator accept it as a whole.
pub fn load_and_validate_program<P: AsRef<Path>>(
    path: P,
    ids: &dyn IdGenerator,
    validator: Arc<dyn Validator>,
) -> Result<Program, LoadError> {
    let program = load_program(path, ids, validator)?;
    Ok(program.into_validated()?)
}
