// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process engine used by tests.
//!
//! Programs are expanded with the crate's own expander and evaluated eagerly: every
//! message delivered to an operator is processed immediately and its emissions are
//! pushed along the outgoing connections. Only the handful of operator types the
//! tests need are supported.

use crate::config::RunMode;
use crate::engine::fragment::{Message, PassOutput};
use crate::errors::EngineError;
use crate::program::{expand, ExpandedGraph, FixedId, Program};
use crate::traits::{Engine, PermissiveValidator, Validation, Validator};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const SUPPORTED_TYPES: [&str; 5] = ["Input", "Output", "Identity", "MovingAverage", "Scale"];

enum OperatorState {
    Passthrough,
    MovingAverage { window: usize, values: VecDeque<f64> },
    Scale { factor: f64 },
}

impl OperatorState {
    fn process(&mut self, message: Message) -> Option<Message> {
        match self {
            OperatorState::Passthrough => Some(message),
            OperatorState::MovingAverage { window, values } => {
                values.push_back(message.value);
                if values.len() > *window {
                    values.pop_front();
                }
                (values.len() == *window).then(|| {
                    Message::new(message.time, values.iter().sum::<f64>() / *window as f64)
                })
            }
            OperatorState::Scale { factor } => Some(Message::new(message.time, message.value * *factor)),
        }
    }
}

struct Instance {
    graph: ExpandedGraph,
    operators: HashMap<String, OperatorState>,
    pending: Vec<(String, Message)>,
}

impl Instance {
    fn new(graph: ExpandedGraph) -> Result<Self, EngineError> {
        let mut operators = HashMap::new();
        for op in &graph.operators {
            let state = match op.op_type.as_str() {
                "Input" | "Output" | "Identity" => OperatorState::Passthrough,
                "MovingAverage" => OperatorState::MovingAverage {
                    window: op
                        .parameters
                        .get("window_size")
                        .and_then(|v| v.as_u64())
                        .filter(|w| *w > 0)
                        .ok_or_else(|| {
                            EngineError::Rejected(format!("operator '{}' needs a positive window_size", op.id))
                        })? as usize,
                    values: VecDeque::new(),
                },
                "Scale" => OperatorState::Scale {
                    factor: op.parameters.get("value").and_then(|v| v.as_f64()).ok_or_else(|| {
                        EngineError::Rejected(format!("operator '{}' needs a numeric value", op.id))
                    })?,
                },
                other => return Err(EngineError::Rejected(format!("unknown operator type '{}'", other))),
            };
            operators.insert(op.id.clone(), state);
        }
        if graph.entry.is_none() {
            return Err(EngineError::Rejected("program has no entry operator".to_string()));
        }
        Ok(Self {
            graph,
            operators,
            pending: Vec::new(),
        })
    }

    fn run_pass(&mut self, mode: RunMode) -> PassOutput {
        let mut emitted = PassOutput::new();
        let mut queue: VecDeque<(String, Message)> = VecDeque::new();
        if let Some(entry) = &self.graph.entry {
            for (_, message) in self.pending.drain(..) {
                queue.push_back((entry.operator.clone(), message));
            }
        }

        while let Some((operator, message)) = queue.pop_front() {
            let Some(output) = self.operators.get_mut(&operator).and_then(|s| s.process(message)) else {
                continue;
            };
            emitted
                .entry(operator.clone())
                .or_default()
                .entry("o1".to_string())
                .or_default()
                .push(output);
            for conn in self.graph.connections.iter().filter(|c| c.from == operator && c.from_port == "o1") {
                queue.push_back((conn.to.clone(), output));
            }
        }

        match mode {
            RunMode::Debug => emitted,
            RunMode::Aggregate => {
                let mut selected = PassOutput::new();
                for binding in &self.graph.outputs {
                    let resolved = &binding.resolved;
                    if let Some(messages) = emitted.get(&resolved.operator).and_then(|p| p.get(&resolved.port)) {
                        selected
                            .entry(resolved.operator.clone())
                            .or_default()
                            .insert(resolved.port.clone(), messages.clone());
                    }
                }
                selected
            }
        }
    }
}

/// A test engine that evaluates programs in-process.
#[derive(Default)]
pub struct SimEngine {
    instances: Mutex<HashMap<String, Instance>>,
    reject_create: Option<String>,
    fail_pass: Option<usize>,
    creates: AtomicUsize,
    deletes: AtomicUsize,
    passes: AtomicUsize,
}

impl SimEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// An engine whose instance creation always fails with `payload`.
    pub fn rejecting(payload: &str) -> Arc<Self> {
        Arc::new(Self {
            reject_create: Some(payload.to_string()),
            ..Self::default()
        })
    }

    /// An engine whose `n`th processing pass (counting from 1) fails. The messages
    /// buffered for that pass are discarded.
    pub fn failing_pass(n: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_pass: Some(n),
            ..Self::default()
        })
    }

    pub fn live_instances(&self) -> usize {
        self.instances.lock().map(|i| i.len()).unwrap_or(0)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn passes(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }

    fn with_instance<T>(
        &self,
        program_id: &str,
        f: impl FnOnce(&mut Instance) -> T,
    ) -> Result<T, EngineError> {
        let mut instances = self
            .instances
            .lock()
            .map_err(|_| EngineError::Transport("engine state poisoned".to_string()))?;
        instances
            .get_mut(program_id)
            .map(f)
            .ok_or_else(|| EngineError::UnknownInstance(program_id.to_string()))
    }
}

impl Validator for SimEngine {
    fn validate_program(&self, program_json: &str) -> Validation {
        match Program::from_json(program_json, &FixedId::new("validate"), Arc::new(PermissiveValidator)) {
            Ok(_) => Validation::ok(),
            Err(e) => Validation::rejected(e.to_string()),
        }
    }

    fn validate_operator(&self, op_type: &str, _operator_json: &str) -> Validation {
        if SUPPORTED_TYPES.contains(&op_type) {
            Validation::ok()
        } else {
            Validation::rejected(format!("unknown operator type '{}'", op_type))
        }
    }
}

#[async_trait]
impl Engine for SimEngine {
    async fn create_instance(&self, program_id: &str, program_json: &str) -> Result<(), EngineError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if let Some(payload) = &self.reject_create {
            return EngineError::from_create_payload(payload);
        }

        let program = Program::from_json(program_json, &FixedId::new(program_id), Arc::new(PermissiveValidator))
            .map_err(|e| EngineError::Rejected(e.to_string()))?;
        let graph = expand(&program).map_err(|e| EngineError::Rejected(e.to_string()))?;
        let instance = Instance::new(graph)?;

        self.instances
            .lock()
            .map_err(|_| EngineError::Transport("engine state poisoned".to_string()))?
            .insert(program_id.to_string(), instance);
        Ok(())
    }

    async fn delete_instance(&self, program_id: &str) -> Result<(), EngineError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.instances
            .lock()
            .map_err(|_| EngineError::Transport("engine state poisoned".to_string()))?
            .remove(program_id);
        Ok(())
    }

    async fn submit_message(&self, program_id: &str, port_id: &str, message: Message) -> Result<(), EngineError> {
        self.with_instance(program_id, |instance| {
            instance.pending.push((port_id.to_string(), message))
        })
    }

    async fn run_pass(&self, program_id: &str, mode: RunMode) -> Result<PassOutput, EngineError> {
        let pass = self.passes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_pass == Some(pass) {
            self.with_instance(program_id, |instance| instance.pending.clear())?;
            return Err(EngineError::Transport(format!("pass {} lost", pass)));
        }
        self.with_instance(program_id, |instance| instance.run_pass(mode))
    }

    async fn entry_ports(&self, program_id: &str) -> Result<Vec<String>, EngineError> {
        self.with_instance(program_id, |instance| {
            instance
                .graph
                .entry
                .as_ref()
                .map(|e| vec![e.port.clone()])
                .unwrap_or_default()
        })
    }
}
