// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use thiserror::Error;

/// Errors reported by an [`Engine`](crate::traits::Engine) implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The engine refused to create the instance; carries its error payload.
    #[error("{0}")]
    Rejected(String),

    /// The call never reached the engine or its answer was lost.
    #[error("Engine transport error: {0}")]
    Transport(String),

    /// No live instance exists for the given program id.
    #[error("No engine instance for program '{0}'")]
    UnknownInstance(String),

    /// The engine answered with something that could not be decoded.
    #[error("Engine protocol error: {0}")]
    Protocol(String),
}

#[derive(Deserialize)]
struct ErrorPayload {
    error: String,
}

impl EngineError {
    /// Interpret the raw string returned by the engine's `createProgram` binding.
    ///
    /// An empty string means success. Anything else is a rejection: the `error`
    /// field of a JSON payload when present, otherwise the raw text.
    pub fn from_create_payload(payload: &str) -> Result<(), EngineError> {
        let trimmed = payload.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        match serde_json::from_str::<ErrorPayload>(trimmed) {
            Ok(p) => Err(EngineError::Rejected(p.error)),
            Err(_) => Err(EngineError::Rejected(trimmed.to_string())),
        }
    }
}
