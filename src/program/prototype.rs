// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Prototype definitions, their registry, and instantiation.
//!
//! A prototype is a parameterized sub-graph. Registering one checks its shape once;
//! instantiating one binds caller values against the declared parameters and yields a
//! single instance operator. The internal operators are not copied into the program:
//! they are expanded later by [`expand`](crate::program::expand), by whichever side
//! needs the flat graph.

use crate::errors::ProgramError;
use crate::observability::messages::program::PrototypeRegistered;
use crate::observability::messages::StructuredLog;
use crate::program::operator::Operator;
use crate::program::serializer::PrototypeDocument;
use crate::program::template::TemplateValue;
use crate::program::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Keys every prototype document must carry.
pub const REQUIRED_PROTOTYPE_KEYS: [&str; 5] =
    ["parameters", "operators", "connections", "entry", "output"];

/// Declared type of a prototype parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Number,
    String,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ParameterType::Number => value.is_number(),
            ParameterType::String => value.is_string(),
            ParameterType::Boolean => value.is_boolean(),
            ParameterType::Array => value.is_array(),
            ParameterType::Object => value.is_object(),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterType::Number => "number",
            ParameterType::String => "string",
            ParameterType::Boolean => "boolean",
            ParameterType::Array => "array",
            ParameterType::Object => "object",
        };
        f.write_str(name)
    }
}

/// A declared prototype parameter. Without a default it is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrototypeParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl PrototypeParameter {
    pub fn required(name: impl Into<String>, param_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            param_type,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, param_type: ParameterType, default: Value) -> Self {
        Self {
            name: name.into(),
            param_type,
            default: Some(default),
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// An operator port inside a prototype. The port falls back to `i1` for the entry
/// and `o1` for the output when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRef {
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

impl PortRef {
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            port: None,
        }
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn port_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.port.as_deref().unwrap_or(default)
    }
}

/// A parameterized sub-graph template.
#[derive(Debug, Clone, PartialEq)]
pub struct PrototypeDefinition {
    pub parameters: Vec<PrototypeParameter>,
    pub operators: Vec<Operator>,
    pub connections: Vec<Connection>,
    pub entry: PortRef,
    pub output: PortRef,
}

impl PrototypeDefinition {
    /// Check the definition's internal consistency.
    fn check(&self) -> Result<(), String> {
        let mut names = HashSet::new();
        for param in &self.parameters {
            if !names.insert(param.name.as_str()) {
                return Err(format!("parameter '{}' is declared twice", param.name));
            }
            if let Some(default) = &param.default {
                if !param.param_type.accepts(default) {
                    return Err(format!(
                        "default of parameter '{}' must be a {}",
                        param.name, param.param_type
                    ));
                }
            }
        }

        let mut ids = HashSet::new();
        for op in &self.operators {
            if !ids.insert(op.id.as_str()) {
                return Err(format!("operator id '{}' is used twice", op.id));
            }
            if let Some(reserved) = op.reserved_parameter() {
                return Err(format!("operator '{}' has reserved parameter name '{}'", op.id, reserved));
            }
            for value in op.parameters.values() {
                if let Some(unknown) = value.references().into_iter().find(|r| !names.contains(r)) {
                    return Err(format!(
                        "operator '{}' references undeclared parameter '{}'",
                        op.id, unknown
                    ));
                }
            }
        }

        for conn in &self.connections {
            for end in [&conn.from, &conn.to] {
                if !ids.contains(end.as_str()) {
                    return Err(format!("connection references unknown operator '{}'", end));
                }
            }
        }

        if !ids.contains(self.entry.operator.as_str()) {
            return Err(format!("entry operator '{}' is not defined", self.entry.operator));
        }
        if !ids.contains(self.output.operator.as_str()) {
            return Err(format!("output operator '{}' is not defined", self.output.operator));
        }

        Ok(())
    }

    /// Bind `values` against the declared parameters.
    ///
    /// Undeclared names and mistyped values are rejected first. Missing required
    /// parameters are then reported all at once, in declaration order. Omitted
    /// optional parameters take their declared default.
    pub fn resolve_parameters(
        &self,
        instance_id: &str,
        prototype_id: &str,
        values: &BTreeMap<String, Value>,
    ) -> Result<BTreeMap<String, Value>, ProgramError> {
        let mut resolved = BTreeMap::new();
        for (name, value) in values {
            let declared = self
                .parameters
                .iter()
                .find(|p| &p.name == name)
                .ok_or_else(|| ProgramError::UnknownParameter {
                    instance: instance_id.to_string(),
                    parameter: name.clone(),
                })?;
            if !declared.param_type.accepts(value) {
                return Err(ProgramError::ParameterType {
                    instance: instance_id.to_string(),
                    parameter: name.clone(),
                    expected: declared.param_type.to_string(),
                });
            }
            resolved.insert(name.clone(), value.clone());
        }

        let missing: Vec<String> = self
            .parameters
            .iter()
            .filter(|p| p.is_required() && !values.contains_key(&p.name))
            .map(|p| p.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ProgramError::MissingParameters {
                instance: instance_id.to_string(),
                prototype: prototype_id.to_string(),
                missing,
            });
        }

        for param in &self.parameters {
            if let (false, Some(default)) = (resolved.contains_key(&param.name), &param.default) {
                resolved.insert(param.name.clone(), default.clone());
            }
        }

        Ok(resolved)
    }
}

/// Registered prototypes, keyed by prototype id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrototypeRegistry(BTreeMap<String, PrototypeDefinition>);

impl PrototypeRegistry {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Register a typed definition after checking its internal consistency.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        definition: PrototypeDefinition,
    ) -> Result<(), ProgramError> {
        let id = id.into();
        definition
            .check()
            .map_err(|reason| ProgramError::InvalidPrototype {
                id: id.clone(),
                reason,
            })?;

        PrototypeRegistered {
            prototype_id: &id,
            parameter_count: definition.parameters.len(),
            operator_count: definition.operators.len(),
        }
        .log();

        self.0.insert(id, definition);
        Ok(())
    }

    /// Register a definition given in its document form.
    ///
    /// Every missing required key is reported at once as `MalformedPrototype`.
    pub fn register_json(&mut self, id: impl Into<String>, definition: Value) -> Result<(), ProgramError> {
        let id = id.into();
        let missing: Vec<String> = match definition.as_object() {
            Some(obj) => REQUIRED_PROTOTYPE_KEYS
                .iter()
                .filter(|k| !obj.contains_key(**k))
                .map(|k| k.to_string())
                .collect(),
            None => REQUIRED_PROTOTYPE_KEYS.iter().map(|k| k.to_string()).collect(),
        };
        if !missing.is_empty() {
            return Err(ProgramError::MalformedPrototype { id, missing });
        }

        let document: PrototypeDocument =
            serde_json::from_value(definition).map_err(|e| ProgramError::InvalidPrototype {
                id: id.clone(),
                reason: e.to_string(),
            })?;
        let definition = document
            .into_definition()
            .map_err(|e| ProgramError::InvalidPrototype {
                id: id.clone(),
                reason: e.to_string(),
            })?;

        self.register(id, definition)
    }

    /// Build the instance operator for `prototype_id` bound to `values`.
    pub fn instantiate(
        &self,
        instance_id: &str,
        prototype_id: &str,
        values: &BTreeMap<String, Value>,
    ) -> Result<Operator, ProgramError> {
        let definition = self.get(prototype_id).ok_or_else(|| ProgramError::UnknownPrototype {
            id: prototype_id.to_string(),
        })?;
        let resolved = definition.resolve_parameters(instance_id, prototype_id, values)?;

        Ok(Operator::instance(
            instance_id,
            prototype_id,
            resolved
                .into_iter()
                .map(|(k, v)| (k, TemplateValue::Literal(v)))
                .collect(),
        ))
    }

    pub fn get(&self, id: &str) -> Option<&PrototypeDefinition> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PrototypeDefinition)> {
        self.0.iter()
    }
}
