// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The program graph: operators, connections, entry operator, output selection
//! and metadata.
//!
//! Structural invariants (unique ids, no dangling references) are enforced here at
//! the point of mutation. Whether an operator or a whole program makes sense to the
//! engine is delegated to a [`Validator`].

use crate::config::consts::{DEFAULT_API_VERSION, INPUT_OPERATOR_TYPE};
use crate::diagram::Diagram;
use crate::errors::{OperatorRole, ProgramError};
use crate::observability::messages::program::{
    OperatorAdded, OperatorRejected, PrototypeInstantiated, ProgramRejected,
};
use crate::observability::messages::StructuredLog;
use crate::program::identity::{IdGenerator, RandomIdGenerator};
use crate::program::operator::{Operator, OperatorKind};
use crate::program::prototype::{PrototypeDefinition, PrototypeRegistry};
use crate::program::serializer::{OperatorDocument, ProgramDocument};
use crate::program::Connection;
use crate::traits::{Validation, Validator};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Descriptive fields carried along with a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,
    pub date: Option<String>,
    pub api_version: String,
}

impl Default for ProgramMetadata {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            author: None,
            license: None,
            date: None,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

/// Builds a [`Program`] with its identity and metadata.
///
/// # Example
/// ```
/// use rtbot_client::program::{FixedId, Program};
/// use rtbot_client::traits::PermissiveValidator;
/// use std::sync::Arc;
///
/// let program = Program::builder(Arc::new(PermissiveValidator))
///     .title("smoothing")
///     .build_with(&FixedId::new("p1"));
///
/// assert_eq!(program.id(), "p1");
/// assert_eq!(program.metadata().title.as_deref(), Some("smoothing"));
/// ```
pub struct ProgramBuilder {
    id: Option<String>,
    metadata: ProgramMetadata,
    validator: Arc<dyn Validator>,
}

impl ProgramBuilder {
    /// Use an explicit id instead of allocating one.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.metadata.author = Some(author.into());
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.metadata.license = Some(license.into());
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.metadata.date = Some(date.into());
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.metadata.api_version = api_version.into();
        self
    }

    /// Build, allocating a random id unless one was given.
    pub fn build(self) -> Program {
        self.build_with(&RandomIdGenerator::default())
    }

    /// Build, taking the id from `ids` unless one was given.
    pub fn build_with(self, ids: &dyn IdGenerator) -> Program {
        Program {
            id: self.id.unwrap_or_else(|| ids.next_id()),
            metadata: self.metadata,
            entry_operator: None,
            operators: Vec::new(),
            connections: Vec::new(),
            output: BTreeMap::new(),
            prototypes: PrototypeRegistry::new(),
            validator: self.validator,
        }
    }
}

/// A dataflow program under construction.
///
/// Operators and connections keep insertion order. The output mapping is keyed by
/// operator id and lists the ports whose messages are surfaced in run results.
#[derive(Clone)]
pub struct Program {
    id: String,
    metadata: ProgramMetadata,
    entry_operator: Option<String>,
    operators: Vec<Operator>,
    connections: Vec<Connection>,
    output: BTreeMap<String, Vec<String>>,
    prototypes: PrototypeRegistry,
    validator: Arc<dyn Validator>,
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("id", &self.id)
            .field("metadata", &self.metadata)
            .field("entry_operator", &self.entry_operator)
            .field("operators", &self.operators)
            .field("connections", &self.connections)
            .field("output", &self.output)
            .field("prototypes", &self.prototypes)
            .finish_non_exhaustive()
    }
}

impl Program {
    pub fn builder(validator: Arc<dyn Validator>) -> ProgramBuilder {
        ProgramBuilder {
            id: None,
            metadata: ProgramMetadata::default(),
            validator,
        }
    }

    /// An empty program with a random id and default metadata.
    pub fn new(validator: Arc<dyn Validator>) -> Self {
        Self::builder(validator).build()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn metadata(&self) -> &ProgramMetadata {
        &self.metadata
    }

    pub fn entry_operator(&self) -> Option<&str> {
        self.entry_operator.as_deref()
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn operator(&self, id: &str) -> Option<&Operator> {
        self.operators.iter().find(|op| op.id == id)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn outputs(&self) -> &BTreeMap<String, Vec<String>> {
        &self.output
    }

    pub fn prototypes(&self) -> &PrototypeRegistry {
        &self.prototypes
    }

    pub fn validator(&self) -> &Arc<dyn Validator> {
        &self.validator
    }

    fn contains(&self, id: &str) -> bool {
        self.operators.iter().any(|op| op.id == id)
    }

    fn require(&self, id: &str, role: OperatorRole) -> Result<(), ProgramError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(ProgramError::UnknownOperator {
                id: id.to_string(),
                role,
            })
        }
    }

    /// Add an operator.
    ///
    /// Primitives are checked by the validator; instances only need their prototype
    /// to be registered. An `Input` operator becomes the entry operator when none is
    /// set yet.
    pub fn add_operator(&mut self, op: Operator) -> Result<&mut Self, ProgramError> {
        self.insert_operator(op, true)
    }

    /// `implicit_entry` is off while replaying a document, whose `entryOperator`
    /// is authoritative.
    fn insert_operator(&mut self, op: Operator, implicit_entry: bool) -> Result<&mut Self, ProgramError> {
        if self.contains(&op.id) {
            return Err(ProgramError::DuplicateId { id: op.id });
        }
        if let Some(parameter) = op.reserved_parameter() {
            return Err(ProgramError::ReservedParameter {
                parameter: parameter.to_string(),
                id: op.id,
            });
        }

        let operator_type = match &op.kind {
            OperatorKind::Primitive { op_type } => {
                let operator_json = serde_json::to_string(&OperatorDocument::from(&op))?;
                let verdict = self.validator.validate_operator(op_type, &operator_json);
                if !verdict.valid {
                    let message = verdict.message().to_string();
                    OperatorRejected {
                        program_id: &self.id,
                        operator_id: &op.id,
                        reason: &message,
                    }
                    .log();
                    return Err(ProgramError::InvalidOperator { id: op.id, message });
                }
                op_type.clone()
            }
            OperatorKind::Prototype { prototype } => {
                if !self.prototypes.contains(prototype) {
                    return Err(ProgramError::UnknownPrototype {
                        id: prototype.clone(),
                    });
                }
                prototype.clone()
            }
        };

        OperatorAdded {
            program_id: &self.id,
            operator_id: &op.id,
            operator_type: &operator_type,
        }
        .log();

        if implicit_entry
            && self.entry_operator.is_none()
            && operator_type == INPUT_OPERATOR_TYPE
            && !op.is_instance()
        {
            self.entry_operator = Some(op.id.clone());
        }
        self.operators.push(op);
        Ok(self)
    }

    /// Add a connection. Both endpoints must already exist.
    pub fn add_connection(&mut self, connection: Connection) -> Result<&mut Self, ProgramError> {
        self.require(&connection.from, OperatorRole::From)?;
        self.require(&connection.to, OperatorRole::To)?;

        if self.connections.contains(&connection) {
            return Err(ProgramError::DuplicateConnection {
                from: connection.from,
                to: connection.to,
                from_port: connection.from_port,
                to_port: connection.to_port,
            });
        }

        self.connections.push(connection);
        Ok(self)
    }

    /// Connect `o1` of `from` to `i1` of `to`.
    pub fn connect(&mut self, from: &str, to: &str) -> Result<&mut Self, ProgramError> {
        self.add_connection(Connection::new(from, to))
    }

    /// Surface `ports` of `operator_id` in run results, replacing any earlier entry.
    pub fn add_output<I, S>(&mut self, operator_id: &str, ports: I) -> Result<&mut Self, ProgramError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require(operator_id, OperatorRole::Output)?;
        self.output.insert(
            operator_id.to_string(),
            ports.into_iter().map(Into::into).collect(),
        );
        Ok(self)
    }

    pub fn set_entry_operator(&mut self, operator_id: &str) -> Result<&mut Self, ProgramError> {
        self.require(operator_id, OperatorRole::Entry)?;
        self.entry_operator = Some(operator_id.to_string());
        Ok(self)
    }

    /// Remove an operator together with its connections and output entry.
    ///
    /// Returns whether the operator existed.
    pub fn remove_operator(&mut self, operator_id: &str) -> bool {
        let before = self.operators.len();
        self.operators.retain(|op| op.id != operator_id);
        if self.operators.len() == before {
            return false;
        }

        self.connections
            .retain(|c| c.from != operator_id && c.to != operator_id);
        self.output.remove(operator_id);
        if self.entry_operator.as_deref() == Some(operator_id) {
            self.entry_operator = None;
        }
        true
    }

    pub fn remove_connection(&mut self, connection: &Connection) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c != connection);
        self.connections.len() != before
    }

    /// Register a prototype given in document form.
    pub fn add_prototype(&mut self, id: &str, definition: Value) -> Result<&mut Self, ProgramError> {
        self.prototypes.register_json(id, definition)?;
        Ok(self)
    }

    pub fn add_prototype_definition(
        &mut self,
        id: &str,
        definition: PrototypeDefinition,
    ) -> Result<&mut Self, ProgramError> {
        self.prototypes.register(id, definition)?;
        Ok(self)
    }

    /// Bind `values` against prototype `prototype_id` and add the resulting instance
    /// as operator `instance_id`.
    pub fn instantiate_prototype<I, K, V>(
        &mut self,
        instance_id: &str,
        prototype_id: &str,
        values: I,
    ) -> Result<&mut Self, ProgramError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let values: BTreeMap<String, Value> = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let instance = self.prototypes.instantiate(instance_id, prototype_id, &values)?;
        let defaulted = instance.parameters.len() - values.len();

        self.add_operator(instance)?;

        PrototypeInstantiated {
            program_id: &self.id,
            instance_id,
            prototype_id,
            defaulted,
        }
        .log();
        Ok(self)
    }

    /// The wire form of this program.
    pub fn serialize(&self) -> ProgramDocument {
        ProgramDocument::from(self)
    }

    pub fn to_json(&self) -> Result<String, ProgramError> {
        Ok(serde_json::to_string(&self.serialize())?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ProgramError> {
        Ok(serde_json::to_string_pretty(&self.serialize())?)
    }

    /// Ask the validator about the whole program. Never fails; a program that cannot
    /// be serialized is reported as invalid.
    pub fn validate(&self) -> Validation {
        match self.to_json() {
            Ok(json) => self.validator.validate_program(&json),
            Err(e) => Validation::rejected(e.to_string()),
        }
    }

    /// Rebuild a program from its wire form by replaying it through the mutation
    /// methods, so every structural check applies.
    pub fn from_document(
        document: ProgramDocument,
        ids: &dyn IdGenerator,
        validator: Arc<dyn Validator>,
    ) -> Result<Self, ProgramError> {
        Self::assemble(document, serde_json::Map::new(), ids, validator)
    }

    /// Rebuild a program from a JSON document.
    ///
    /// Prototypes are registered from their raw form so a definition missing
    /// required keys is reported as `MalformedPrototype`.
    pub fn from_json(
        json: &str,
        ids: &dyn IdGenerator,
        validator: Arc<dyn Validator>,
    ) -> Result<Self, ProgramError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ProgramError::InvalidDocument(e.to_string()))?;
        Self::from_value(value, ids, validator)
    }

    pub(crate) fn from_value(
        mut value: Value,
        ids: &dyn IdGenerator,
        validator: Arc<dyn Validator>,
    ) -> Result<Self, ProgramError> {
        let prototypes = match value.as_object_mut().and_then(|o| o.remove("prototypes")) {
            Some(Value::Object(entries)) => entries,
            Some(_) => {
                return Err(ProgramError::InvalidDocument(
                    "prototypes must be an object".to_string(),
                ))
            }
            None => serde_json::Map::new(),
        };

        let document: ProgramDocument = serde_json::from_value(value)
            .map_err(|e| ProgramError::InvalidDocument(e.to_string()))?;
        Self::assemble(document, prototypes, ids, validator)
    }

    fn assemble(
        document: ProgramDocument,
        raw_prototypes: serde_json::Map<String, Value>,
        ids: &dyn IdGenerator,
        validator: Arc<dyn Validator>,
    ) -> Result<Self, ProgramError> {
        let mut program = Program::builder(validator).build_with(ids);
        program.metadata = ProgramMetadata {
            title: document.title,
            description: document.description,
            author: document.author,
            license: document.license,
            date: document.date,
            api_version: document.api_version,
        };

        for (id, definition) in raw_prototypes {
            program.add_prototype(&id, definition)?;
        }
        for (id, prototype) in document.prototypes {
            program.add_prototype_definition(&id, prototype.into_definition()?)?;
        }

        for op in document.operators {
            program.insert_operator(op.into_operator()?, false)?;
        }
        for connection in document.connections {
            program.add_connection(connection)?;
        }
        for (operator_id, ports) in document.output {
            program.add_output(&operator_id, ports)?;
        }
        if let Some(entry) = document.entry_operator {
            program.set_entry_operator(&entry)?;
        }
        Ok(program)
    }

    /// Rebuild a program from JSON and have the validator accept it as a whole.
    pub fn parse(
        json: &str,
        ids: &dyn IdGenerator,
        validator: Arc<dyn Validator>,
    ) -> Result<Self, ProgramError> {
        Self::from_json(json, ids, validator)?.into_validated()
    }

    /// Keep the program only if the validator accepts it as a whole.
    pub fn into_validated(self) -> Result<Self, ProgramError> {
        let verdict = self.validate();
        if !verdict.valid {
            let message = verdict.message().to_string();
            ProgramRejected {
                program_id: &self.id,
                reason: &message,
            }
            .log();
            return Err(ProgramError::InvalidProgram { message });
        }
        Ok(self)
    }

    /// Render the program as a Mermaid flowchart, with prototype instances expanded.
    pub fn to_mermaid(&self) -> Result<String, ProgramError> {
        Ok(Diagram::from_program(self)?.to_mermaid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::identity::FixedId;
    use crate::program::TemplateValue;
    use crate::traits::PermissiveValidator;
    use serde_json::json;

    struct RejectingValidator;

    impl Validator for RejectingValidator {
        fn validate_program(&self, _program_json: &str) -> Validation {
            Validation::rejected("entry operator is not connected")
        }

        fn validate_operator(&self, op_type: &str, _operator_json: &str) -> Validation {
            if op_type == "Bogus" {
                Validation::rejected("unknown operator type 'Bogus'")
            } else {
                Validation::ok()
            }
        }
    }

    fn program() -> Program {
        Program::builder(Arc::new(PermissiveValidator)).id("p1").build()
    }

    fn ma_chain() -> Program {
        let mut p = program();
        p.add_operator(Operator::new("in1", "Input")).unwrap();
        p.add_operator(Operator::new("ma1", "MovingAverage").with_param("window_size", 3))
            .unwrap();
        p.add_operator(Operator::new("out1", "Output")).unwrap();
        p.connect("in1", "ma1").unwrap().connect("ma1", "out1").unwrap();
        p.add_output("out1", ["o1"]).unwrap();
        p
    }

    fn register_ma_scale(p: &mut Program) {
        p.add_prototype(
            "ma_scale",
            json!({
                "parameters": [
                    {"name": "window_size", "type": "number"},
                    {"name": "scale", "type": "number", "default": 1.0}
                ],
                "operators": [
                    {"id": "ma", "type": "MovingAverage", "window_size": "${window_size}"},
                    {"id": "sc", "type": "Scale", "value": "${scale}"}
                ],
                "connections": [{"from": "ma", "to": "sc"}],
                "entry": {"operator": "ma"},
                "output": {"operator": "sc"}
            }),
        )
        .unwrap();
    }

    #[test]
    fn duplicate_id_fails_for_any_kind() {
        let mut p = ma_chain();
        assert_eq!(
            p.add_operator(Operator::new("ma1", "Scale")).err(),
            Some(ProgramError::DuplicateId {
                id: "ma1".to_string()
            })
        );

        register_ma_scale(&mut p);
        let result = p.instantiate_prototype("in1", "ma_scale", [("window_size", json!(3))]);
        assert!(matches!(result, Err(ProgramError::DuplicateId { .. })));
    }

    #[test]
    fn rejected_operator_carries_validator_message() {
        let mut p = Program::builder(Arc::new(RejectingValidator)).id("p").build();
        let result = p.add_operator(Operator::new("x", "Bogus"));

        assert_eq!(
            result.err(),
            Some(ProgramError::InvalidOperator {
                id: "x".to_string(),
                message: "unknown operator type 'Bogus'".to_string(),
            })
        );
        assert!(p.operators().is_empty());
    }

    #[test]
    fn connection_checks_from_side_first() {
        let mut p = program();
        p.add_operator(Operator::new("a", "Input")).unwrap();

        assert_eq!(
            p.connect("x", "y").err(),
            Some(ProgramError::UnknownOperator {
                id: "x".to_string(),
                role: OperatorRole::From
            })
        );
        assert_eq!(
            p.connect("a", "b").err(),
            Some(ProgramError::UnknownOperator {
                id: "b".to_string(),
                role: OperatorRole::To
            })
        );

        // Adding the operator later does not resurrect the failed connection.
        p.add_operator(Operator::new("b", "Output")).unwrap();
        assert!(p.connections().is_empty());
        p.connect("a", "b").unwrap();
        assert_eq!(p.connections().len(), 1);
    }

    #[test]
    fn identical_connection_is_rejected() {
        let mut p = ma_chain();
        let result = p.connect("in1", "ma1");
        assert!(matches!(result, Err(ProgramError::DuplicateConnection { .. })));

        p.add_connection(Connection::new("in1", "ma1").to_port("i2"))
            .unwrap();
        assert_eq!(p.connections().len(), 3);
    }

    #[test]
    fn output_and_entry_require_known_operators() {
        let mut p = ma_chain();
        assert!(matches!(
            p.add_output("nope", ["o1"]),
            Err(ProgramError::UnknownOperator {
                role: OperatorRole::Output,
                ..
            })
        ));
        assert!(matches!(
            p.set_entry_operator("nope"),
            Err(ProgramError::UnknownOperator {
                role: OperatorRole::Entry,
                ..
            })
        ));

        p.add_output("out1", ["o1", "o2"]).unwrap();
        assert_eq!(p.outputs()["out1"], vec!["o1", "o2"]);
    }

    #[test]
    fn input_operator_becomes_entry() {
        let p = ma_chain();
        assert_eq!(p.entry_operator(), Some("in1"));
    }

    #[test]
    fn round_trip_keeps_a_cleared_entry_operator() {
        let mut p = program();
        p.add_operator(Operator::new("a", "Input")).unwrap();
        p.add_operator(Operator::new("b", "Input")).unwrap();
        assert!(p.remove_operator("a"));
        assert_eq!(p.entry_operator(), None);

        let first = p.to_json().unwrap();
        let reparsed =
            Program::from_json(&first, &FixedId::new("p"), Arc::new(PermissiveValidator)).unwrap();

        assert_eq!(reparsed.entry_operator(), None);
        assert_eq!(reparsed.to_json().unwrap(), first);
    }

    #[test]
    fn reserved_parameter_names_are_rejected() {
        let mut p = program();
        for name in ["id", "type", "prototype"] {
            let result = p.add_operator(Operator::new("c", "Constant").with_param(name, "double"));
            assert_eq!(
                result.err(),
                Some(ProgramError::ReservedParameter {
                    id: "c".to_string(),
                    parameter: name.to_string(),
                })
            );
        }
        assert!(p.operators().is_empty());
    }

    #[test]
    fn remove_operator_cascades() {
        let mut p = ma_chain();
        assert!(p.remove_operator("in1"));
        assert!(!p.remove_operator("in1"));

        assert_eq!(p.entry_operator(), None);
        assert_eq!(p.connections(), &[Connection::new("ma1", "out1")]);

        assert!(p.remove_operator("out1"));
        assert!(p.outputs().is_empty());
        assert!(!p.remove_connection(&Connection::new("ma1", "out1")));
    }

    #[test]
    fn serialize_omits_empty_metadata() {
        let value = serde_json::to_value(program().serialize()).unwrap();
        assert_eq!(
            value,
            json!({"apiVersion": "v1", "operators": [], "connections": [], "output": {}})
        );
    }

    #[test]
    fn serialize_is_deterministic_and_round_trips() {
        let mut p = Program::builder(Arc::new(PermissiveValidator))
            .id("p1")
            .title("smoothing")
            .author("ops")
            .build();
        register_ma_scale(&mut p);
        p.add_operator(Operator::new("in1", "Input")).unwrap();
        p.instantiate_prototype("inst", "ma_scale", [("window_size", json!(3))])
            .unwrap();
        p.connect("in1", "inst").unwrap();
        p.add_output("inst", ["o1"]).unwrap();

        let first = p.to_json().unwrap();
        assert_eq!(first, p.to_json().unwrap());
        assert!(first.starts_with(r#"{"apiVersion":"v1","title":"smoothing","author":"ops","entryOperator":"in1""#));

        let reparsed =
            Program::from_json(&first, &FixedId::new("p1"), Arc::new(PermissiveValidator)).unwrap();
        assert_eq!(reparsed.to_json().unwrap(), first);
        assert_eq!(reparsed.operators(), p.operators());
        assert_eq!(reparsed.prototypes(), p.prototypes());
    }

    #[test]
    fn from_json_reports_malformed_prototypes() {
        let json = r#"{"operators": [], "output": {}, "prototypes": {"p": {"operators": []}}}"#;
        let result = Program::from_json(json, &FixedId::new("x"), Arc::new(PermissiveValidator));
        assert!(matches!(result, Err(ProgramError::MalformedPrototype { ref missing, .. }) if missing.len() == 4));
    }

    #[test]
    fn from_json_replays_structural_checks() {
        let json = r#"{
            "operators": [{"id": "a", "type": "Input"}],
            "connections": [{"from": "a", "to": "ghost"}],
            "output": {}
        }"#;
        let result = Program::from_json(json, &FixedId::new("x"), Arc::new(PermissiveValidator));
        assert!(matches!(result, Err(ProgramError::UnknownOperator { .. })));
    }

    #[test]
    fn instantiate_uses_required_values_plus_defaults() {
        let mut p = program();
        register_ma_scale(&mut p);
        p.instantiate_prototype("inst", "ma_scale", [("window_size", json!(3))])
            .unwrap();

        let instance = p.operator("inst").unwrap();
        assert_eq!(instance.prototype(), Some("ma_scale"));
        assert_eq!(
            instance.parameters,
            BTreeMap::from([
                ("scale".to_string(), TemplateValue::from(1.0)),
                ("window_size".to_string(), TemplateValue::from(3)),
            ])
        );
    }

    #[test]
    fn instance_of_unregistered_prototype_is_rejected() {
        let mut p = program();
        let result = p.add_operator(Operator::instance("inst", "ghost", BTreeMap::new()));
        assert_eq!(
            result.err(),
            Some(ProgramError::UnknownPrototype {
                id: "ghost".to_string()
            })
        );
    }

    #[test]
    fn validate_returns_verdict_verbatim() {
        let p = Program::builder(Arc::new(RejectingValidator)).id("p").build();
        let verdict = p.validate();
        assert!(!verdict.valid);
        assert_eq!(verdict.error.as_deref(), Some("entry operator is not connected"));

        assert!(ma_chain().validate().valid);
    }

    #[test]
    fn parse_raises_on_invalid_program() {
        let json = ma_chain().to_json().unwrap();
        let result = Program::parse(&json, &FixedId::new("p"), Arc::new(RejectingValidator));
        assert_eq!(
            result.err(),
            Some(ProgramError::InvalidProgram {
                message: "entry operator is not connected".to_string()
            })
        );

        let parsed = Program::parse(&json, &FixedId::new("p"), Arc::new(PermissiveValidator)).unwrap();
        assert_eq!(parsed.id(), "p");
        assert_eq!(parsed.entry_operator(), Some("in1"));
    }
}
