// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::config::RunMode;
use crate::engine::fragment::{Message, PassOutput};
use crate::errors::EngineError;
use crate::traits::validator::Validator;

/// The narrow interface to the external dataflow engine.
///
/// The engine keys all runtime state (buffers, operator state) by program id. Calls are
/// plain request/response: a caller awaits each one before issuing the next, and a
/// [`Run`](crate::engine::Run) never has two calls in flight. Timeouts and retries
/// belong to the implementation's transport, not to this crate.
#[async_trait]
pub trait Engine: Validator {
    /// Instantiate the serialized program under `program_id`.
    ///
    /// Returns `EngineError::Rejected` carrying the engine's error payload when the
    /// program cannot be created.
    async fn create_instance(&self, program_id: &str, program_json: &str) -> Result<(), EngineError>;

    /// Tear the instance down. Must be idempotent and safe on unknown ids.
    async fn delete_instance(&self, program_id: &str) -> Result<(), EngineError>;

    /// Buffer one message for `port_id`; nothing is processed until [`Engine::run_pass`].
    async fn submit_message(
        &self,
        program_id: &str,
        port_id: &str,
        message: Message,
    ) -> Result<(), EngineError>;

    /// Process the buffered messages.
    ///
    /// In [`RunMode::Aggregate`] only the operators feeding the declared outputs are
    /// reported; in [`RunMode::Debug`] every operator's every port is.
    async fn run_pass(&self, program_id: &str, mode: RunMode) -> Result<PassOutput, EngineError>;

    /// The input ports the instance accepts external messages on.
    async fn entry_ports(&self, program_id: &str) -> Result<Vec<String>, EngineError>;
}
