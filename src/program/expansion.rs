// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Flattening of prototype instances into a graph of primitive operators.
//!
//! This is the one place parameter references are substituted. Internal operators of
//! an instance are scoped as `instance::inner` (recursively for nested instances) and
//! every connection, the entry operator and the output mapping are rewired through
//! the instance's declared entry and output ports.

use crate::config::consts::{DEFAULT_FROM_PORT, DEFAULT_TO_PORT, SCOPE_SEPARATOR};
use crate::errors::ProgramError;
use crate::program::operator::{Operator, OperatorKind};
use crate::program::prototype::PrototypeRegistry;
use crate::program::{Connection, Program};
use serde_json::Value;
use std::collections::BTreeMap;

/// An operator port in the expanded graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub operator: String,
    pub port: String,
}

impl Endpoint {
    pub fn new(operator: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            port: port.into(),
        }
    }
}

/// A primitive operator after substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedOperator {
    /// Scoped id, `outer::inner` for operators inside instances
    pub id: String,
    pub op_type: String,
    pub parameters: BTreeMap<String, Value>,
    /// 0 for top-level operators, +1 per enclosing instance
    pub depth: usize,
    /// Scoped id of the innermost enclosing instance
    pub parent: Option<String>,
}

/// An expanded prototype instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceFrame {
    pub id: String,
    pub prototype: String,
    pub depth: usize,
    pub parent: Option<String>,
    pub entry: Endpoint,
    pub output: Endpoint,
}

/// A declared output port and the expanded port that actually produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBinding {
    pub declared: Endpoint,
    pub resolved: Endpoint,
}

/// The flattened program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpandedGraph {
    /// Primitives in insertion order, instance contents in place of the instance
    pub operators: Vec<ExpandedOperator>,
    pub instances: Vec<InstanceFrame>,
    pub connections: Vec<Connection>,
    pub entry: Option<Endpoint>,
    pub outputs: Vec<OutputBinding>,
}

impl ExpandedGraph {
    pub fn operator(&self, id: &str) -> Option<&ExpandedOperator> {
        self.operators.iter().find(|op| op.id == id)
    }

    pub fn is_entry(&self, id: &str) -> bool {
        self.entry.as_ref().is_some_and(|e| e.operator == id)
    }

    pub fn is_output(&self, id: &str) -> bool {
        self.outputs.iter().any(|b| b.resolved.operator == id)
    }
}

/// Flatten `program`, resolving every prototype instance.
pub fn expand(program: &Program) -> Result<ExpandedGraph, ProgramError> {
    let mut expander = Expander {
        registry: program.prototypes(),
        chain: Vec::new(),
        graph: ExpandedGraph::default(),
    };

    let top = expander.expand_scope(
        program.operators(),
        program.connections(),
        &BTreeMap::new(),
        None,
    )?;

    expander.graph.entry = program.entry_operator().map(|id| match top.get(id) {
        Some(frame) => frame.0.clone(),
        None => Endpoint::new(id, DEFAULT_TO_PORT),
    });

    for (operator, ports) in program.outputs() {
        for port in ports {
            let resolved = match top.get(operator.as_str()) {
                Some(frame) => frame.1.clone(),
                None => Endpoint::new(operator.clone(), port.clone()),
            };
            expander.graph.outputs.push(OutputBinding {
                declared: Endpoint::new(operator.clone(), port.clone()),
                resolved,
            });
        }
    }

    Ok(expander.graph)
}

fn scoped(parent: Option<&str>, id: &str) -> String {
    match parent {
        Some(parent) => format!("{}{}{}", parent, SCOPE_SEPARATOR, id),
        None => id.to_string(),
    }
}

/// Entry and output endpoint of an instance, keyed by its local id.
type InstancePorts<'a> = BTreeMap<&'a str, (Endpoint, Endpoint)>;

struct Expander<'r> {
    registry: &'r PrototypeRegistry,
    chain: Vec<String>,
    graph: ExpandedGraph,
}

impl Expander<'_> {
    fn expand_scope<'o>(
        &mut self,
        operators: &'o [Operator],
        connections: &[Connection],
        bindings: &BTreeMap<String, Value>,
        parent: Option<&str>,
    ) -> Result<InstancePorts<'o>, ProgramError> {
        let depth = self.chain.len();
        let mut instances = InstancePorts::new();

        for op in operators {
            let id = scoped(parent, &op.id);
            let parameters = resolve_all(op, bindings, parent)?;

            match &op.kind {
                OperatorKind::Primitive { op_type } => {
                    self.graph.operators.push(ExpandedOperator {
                        id,
                        op_type: op_type.clone(),
                        parameters,
                        depth,
                        parent: parent.map(str::to_string),
                    });
                }
                OperatorKind::Prototype { prototype } => {
                    let ports = self.expand_instance(&id, prototype, &parameters, parent, depth)?;
                    instances.insert(op.id.as_str(), ports);
                }
            }
        }

        for conn in connections {
            let from = match instances.get(conn.from.as_str()) {
                Some((_, output)) => output.clone(),
                None => Endpoint::new(scoped(parent, &conn.from), conn.from_port.clone()),
            };
            let to = match instances.get(conn.to.as_str()) {
                Some((entry, _)) => entry.clone(),
                None => Endpoint::new(scoped(parent, &conn.to), conn.to_port.clone()),
            };
            self.graph.connections.push(Connection {
                from: from.operator,
                to: to.operator,
                from_port: from.port,
                to_port: to.port,
            });
        }

        Ok(instances)
    }

    fn expand_instance(
        &mut self,
        id: &str,
        prototype: &str,
        values: &BTreeMap<String, Value>,
        parent: Option<&str>,
        depth: usize,
    ) -> Result<(Endpoint, Endpoint), ProgramError> {
        if self.chain.iter().any(|p| p == prototype) {
            let mut chain = self.chain.clone();
            chain.push(prototype.to_string());
            return Err(ProgramError::RecursivePrototype { chain });
        }

        let registry = self.registry;
        let definition = registry
            .get(prototype)
            .ok_or_else(|| ProgramError::UnknownPrototype {
                id: prototype.to_string(),
            })?;
        let bindings = definition.resolve_parameters(id, prototype, values)?;

        let frame_index = self.graph.instances.len();
        self.graph.instances.push(InstanceFrame {
            id: id.to_string(),
            prototype: prototype.to_string(),
            depth,
            parent: parent.map(str::to_string),
            entry: Endpoint::new(scoped(Some(id), &definition.entry.operator), definition.entry.port_or(DEFAULT_TO_PORT)),
            output: Endpoint::new(
                scoped(Some(id), &definition.output.operator),
                definition.output.port_or(DEFAULT_FROM_PORT),
            ),
        });

        self.chain.push(prototype.to_string());
        let inner = self.expand_scope(
            &definition.operators,
            &definition.connections,
            &bindings,
            Some(id),
        )?;
        self.chain.pop();

        // An entry or output that is itself an instance forwards to that instance's port.
        let frame = &mut self.graph.instances[frame_index];
        if let Some((entry, _)) = inner.get(definition.entry.operator.as_str()) {
            frame.entry = entry.clone();
        }
        if let Some((_, output)) = inner.get(definition.output.operator.as_str()) {
            frame.output = output.clone();
        }

        Ok((frame.entry.clone(), frame.output.clone()))
    }
}

fn resolve_all(
    op: &Operator,
    bindings: &BTreeMap<String, Value>,
    parent: Option<&str>,
) -> Result<BTreeMap<String, Value>, ProgramError> {
    op.parameters
        .iter()
        .map(|(name, value)| {
            value
                .resolve(bindings)
                .map(|v| (name.clone(), v))
                .map_err(|parameter| ProgramError::UnresolvedParameter {
                    instance: parent.unwrap_or(&op.id).to_string(),
                    parameter,
                })
        })
        .collect()
}
