// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wire form of programs and prototypes.
//!
//! These document types are a pure mapping of the in-memory graph; no validation
//! happens here. Building a [`Program`] from a document replays it through the
//! program's mutation methods, which is where the checks live.

use crate::config::consts::DEFAULT_API_VERSION;
use crate::errors::ProgramError;
use crate::program::operator::{Operator, OperatorKind};
use crate::program::prototype::{PortRef, PrototypeDefinition, PrototypeParameter};
use crate::program::template::TemplateValue;
use crate::program::{Connection, Program};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const INSTANCE_PARAMETERS_KEY: &str = "parameters";

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

/// Serialized program, in the key order the engine documents use.
///
/// Optional metadata is only emitted when set, `entryOperator` only when an entry
/// operator exists, and `prototypes` only when at least one is registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDocument {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_operator: Option<String>,
    #[serde(default)]
    pub operators: Vec<OperatorDocument>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    pub output: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prototypes: BTreeMap<String, PrototypeDocument>,
}

/// A single operator on the wire.
///
/// Primitives are flat (`{"id", "type", "window_size": 3}`); prototype instances
/// carry their values under `parameters` (`{"id", "prototype", "parameters": {..}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorDocument {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub op_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototype: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, TemplateValue>,
}

impl OperatorDocument {
    /// Decode an operator of the program itself. `${..}` strings are plain data here.
    pub fn into_operator(self) -> Result<Operator, ProgramError> {
        self.decode(false)
    }

    /// Decode an operator of a prototype body, keeping `${..}` parameter references.
    pub fn into_template_operator(self) -> Result<Operator, ProgramError> {
        self.decode(true)
    }

    fn decode(mut self, templated: bool) -> Result<Operator, ProgramError> {
        let settle = |value: TemplateValue| if templated { value } else { value.into_plain() };

        match (self.op_type, self.prototype) {
            (Some(op_type), None) => Ok(Operator {
                id: self.id,
                kind: OperatorKind::Primitive { op_type },
                parameters: self.fields.into_iter().map(|(k, v)| (k, settle(v))).collect(),
            }),
            (None, Some(prototype)) => {
                let parameters = match self.fields.remove(INSTANCE_PARAMETERS_KEY) {
                    None => BTreeMap::new(),
                    Some(TemplateValue::Map(entries)) => {
                        entries.into_iter().map(|(k, v)| (k, settle(v))).collect()
                    }
                    Some(TemplateValue::Literal(Value::Object(entries))) => entries
                        .into_iter()
                        .map(|(k, v)| (k, TemplateValue::Literal(v)))
                        .collect(),
                    Some(_) => {
                        return Err(ProgramError::InvalidDocument(format!(
                            "parameters of instance '{}' must be an object",
                            self.id
                        )))
                    }
                };
                if let Some(extra) = self.fields.keys().next() {
                    return Err(ProgramError::InvalidDocument(format!(
                        "instance '{}' has unexpected key '{}'",
                        self.id, extra
                    )));
                }
                Ok(Operator::instance(self.id, prototype, parameters))
            }
            (Some(_), Some(_)) => Err(ProgramError::InvalidDocument(format!(
                "operator '{}' has both a type and a prototype",
                self.id
            ))),
            (None, None) => Err(ProgramError::InvalidDocument(format!(
                "operator '{}' has neither a type nor a prototype",
                self.id
            ))),
        }
    }
}

impl From<&Operator> for OperatorDocument {
    fn from(op: &Operator) -> Self {
        match &op.kind {
            OperatorKind::Primitive { op_type } => OperatorDocument {
                id: op.id.clone(),
                op_type: Some(op_type.clone()),
                prototype: None,
                fields: op.parameters.clone(),
            },
            OperatorKind::Prototype { prototype } => {
                let parameters = Value::Object(
                    op.parameters
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_json()))
                        .collect(),
                );
                OperatorDocument {
                    id: op.id.clone(),
                    op_type: None,
                    prototype: Some(prototype.clone()),
                    fields: BTreeMap::from([(
                        INSTANCE_PARAMETERS_KEY.to_string(),
                        TemplateValue::from_json(parameters),
                    )]),
                }
            }
        }
    }
}

/// A prototype definition on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrototypeDocument {
    pub parameters: Vec<PrototypeParameter>,
    pub operators: Vec<OperatorDocument>,
    pub connections: Vec<Connection>,
    pub entry: PortRef,
    pub output: PortRef,
}

impl PrototypeDocument {
    pub fn into_definition(self) -> Result<PrototypeDefinition, ProgramError> {
        Ok(PrototypeDefinition {
            parameters: self.parameters,
            operators: self
                .operators
                .into_iter()
                .map(OperatorDocument::into_template_operator)
                .collect::<Result<_, _>>()?,
            connections: self.connections,
            entry: self.entry,
            output: self.output,
        })
    }
}

impl From<&PrototypeDefinition> for PrototypeDocument {
    fn from(definition: &PrototypeDefinition) -> Self {
        PrototypeDocument {
            parameters: definition.parameters.clone(),
            operators: definition.operators.iter().map(OperatorDocument::from).collect(),
            connections: definition.connections.clone(),
            entry: definition.entry.clone(),
            output: definition.output.clone(),
        }
    }
}

impl From<&Program> for ProgramDocument {
    fn from(program: &Program) -> Self {
        let metadata = program.metadata();
        ProgramDocument {
            api_version: metadata.api_version.clone(),
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            author: metadata.author.clone(),
            license: metadata.license.clone(),
            date: metadata.date.clone(),
            entry_operator: program.entry_operator().map(str::to_string),
            operators: program.operators().iter().map(OperatorDocument::from).collect(),
            connections: program.connections().to_vec(),
            output: program.outputs().clone(),
            prototypes: program
                .prototypes()
                .iter()
                .map(|(id, definition)| (id.clone(), PrototypeDocument::from(definition)))
                .collect(),
        }
    }
}
