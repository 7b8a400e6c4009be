// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Operator parameter values that may reference prototype parameters.
//!
//! Inside a prototype definition an operator parameter is either a literal or a
//! reference to one of the prototype's declared parameters. References are kept as a
//! distinct variant and resolved by a single substitution pass ([`TemplateValue::resolve`])
//! when an instance is expanded. The `${name}` string form exists only on the wire:
//! it is recognised when a document is decoded and produced when one is encoded.

use crate::config::consts::{PARAMETER_MARKER_CLOSE, PARAMETER_MARKER_OPEN};
use serde::de::Deserializer;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// A parameter value that may contain references to prototype parameters.
///
/// `List` and `Map` only appear when at least one reference is nested inside;
/// values without references are always kept as a single `Literal`.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Literal(Value),
    Parameter(String),
    List(Vec<TemplateValue>),
    Map(BTreeMap<String, TemplateValue>),
}

impl TemplateValue {
    /// Reference the prototype parameter `name`.
    pub fn param(name: impl Into<String>) -> Self {
        TemplateValue::Parameter(name.into())
    }

    /// Decode a wire value, turning `${name}` markers into parameter references.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => match parse_marker(&s) {
                Some(name) => TemplateValue::Parameter(name.to_string()),
                None => TemplateValue::Literal(Value::String(s)),
            },
            Value::Array(items) => {
                let items: Vec<TemplateValue> = items.into_iter().map(Self::from_json).collect();
                if items.iter().all(TemplateValue::is_literal) {
                    TemplateValue::Literal(Value::Array(
                        items.into_iter().filter_map(TemplateValue::into_literal).collect(),
                    ))
                } else {
                    TemplateValue::List(items)
                }
            }
            Value::Object(entries) => {
                let entries: BTreeMap<String, TemplateValue> = entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect();
                if entries.values().all(TemplateValue::is_literal) {
                    TemplateValue::Literal(Value::Object(
                        entries
                            .into_iter()
                            .filter_map(|(k, v)| v.into_literal().map(|v| (k, v)))
                            .collect(),
                    ))
                } else {
                    TemplateValue::Map(entries)
                }
            }
            other => TemplateValue::Literal(other),
        }
    }

    /// Encode back to the wire form.
    pub fn to_json(&self) -> Value {
        match self {
            TemplateValue::Literal(v) => v.clone(),
            TemplateValue::Parameter(name) => Value::String(marker(name)),
            TemplateValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            TemplateValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, TemplateValue::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            TemplateValue::Literal(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_literal(self) -> Option<Value> {
        match self {
            TemplateValue::Literal(v) => Some(v),
            _ => None,
        }
    }

    /// Names of all parameters referenced anywhere inside this value.
    pub fn references(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            TemplateValue::Literal(_) => {}
            TemplateValue::Parameter(name) => {
                names.insert(name.as_str());
            }
            TemplateValue::List(items) => items.iter().for_each(|i| i.collect_references(names)),
            TemplateValue::Map(entries) => entries.values().for_each(|v| v.collect_references(names)),
        }
    }

    /// Substitute every reference with its bound value.
    ///
    /// Returns the name of the first reference with no binding as the error.
    pub fn resolve(&self, bindings: &BTreeMap<String, Value>) -> Result<Value, String> {
        match self {
            TemplateValue::Literal(v) => Ok(v.clone()),
            TemplateValue::Parameter(name) => bindings.get(name).cloned().ok_or_else(|| name.clone()),
            TemplateValue::List(items) => items
                .iter()
                .map(|i| i.resolve(bindings))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            TemplateValue::Map(entries) => entries
                .iter()
                .map(|(k, v)| v.resolve(bindings).map(|v| (k.clone(), v)))
                .collect::<Result<serde_json::Map<_, _>, _>>()
                .map(Value::Object),
        }
    }

    /// The same value with every reference turned back into its literal marker text.
    ///
    /// Operators outside prototype bodies have no parameters to refer to, so a
    /// marker-shaped string there is plain data.
    pub fn into_plain(self) -> TemplateValue {
        match self {
            TemplateValue::Literal(_) => self,
            other => TemplateValue::Literal(other.to_json()),
        }
    }
}

fn marker(name: &str) -> String {
    format!("{}{}{}", PARAMETER_MARKER_OPEN, name, PARAMETER_MARKER_CLOSE)
}

fn parse_marker(s: &str) -> Option<&str> {
    let name = s
        .strip_prefix(PARAMETER_MARKER_OPEN)?
        .strip_suffix(PARAMETER_MARKER_CLOSE)?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

impl Serialize for TemplateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TemplateValue::Literal(v) => v.serialize(serializer),
            TemplateValue::Parameter(name) => serializer.serialize_str(&marker(name)),
            TemplateValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            TemplateValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for TemplateValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(TemplateValue::from_json)
    }
}

impl From<Value> for TemplateValue {
    fn from(value: Value) -> Self {
        // Programmatic literals never contain references.
        TemplateValue::Literal(value)
    }
}

impl From<f64> for TemplateValue {
    fn from(value: f64) -> Self {
        TemplateValue::Literal(Value::from(value))
    }
}

impl From<i64> for TemplateValue {
    fn from(value: i64) -> Self {
        TemplateValue::Literal(Value::from(value))
    }
}

impl From<u64> for TemplateValue {
    fn from(value: u64) -> Self {
        TemplateValue::Literal(Value::from(value))
    }
}

impl From<i32> for TemplateValue {
    fn from(value: i32) -> Self {
        TemplateValue::Literal(Value::from(value))
    }
}

impl From<bool> for TemplateValue {
    fn from(value: bool) -> Self {
        TemplateValue::Literal(Value::from(value))
    }
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        TemplateValue::Literal(Value::from(value))
    }
}

impl From<Vec<f64>> for TemplateValue {
    fn from(value: Vec<f64>) -> Self {
        TemplateValue::Literal(Value::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn marker_strings_decode_to_references() {
        assert_eq!(
            TemplateValue::from_json(json!("${window_size}")),
            TemplateValue::param("window_size")
        );
        // Not markers
        assert_eq!(
            TemplateValue::from_json(json!("${}")),
            TemplateValue::Literal(json!("${}"))
        );
        assert_eq!(
            TemplateValue::from_json(json!("price ${x")),
            TemplateValue::Literal(json!("price ${x"))
        );
    }

    #[test]
    fn containers_without_references_stay_literal() {
        let value = TemplateValue::from_json(json!({"coeff": [1.0, 2.0], "n": 3}));
        assert_eq!(value, TemplateValue::Literal(json!({"coeff": [1.0, 2.0], "n": 3})));
    }

    #[test]
    fn nested_references_are_found_and_resolved() {
        let value = TemplateValue::from_json(json!({"coeff": ["${a}", 1.0], "n": "${n}"}));
        assert!(matches!(value, TemplateValue::Map(_)));
        assert_eq!(value.references().into_iter().collect::<Vec<_>>(), vec!["a", "n"]);

        let bindings = BTreeMap::from([
            ("a".to_string(), json!(0.5)),
            ("n".to_string(), json!(4)),
        ]);
        assert_eq!(
            value.resolve(&bindings).unwrap(),
            json!({"coeff": [0.5, 1.0], "n": 4})
        );
    }

    #[test]
    fn resolve_reports_missing_binding() {
        let value = TemplateValue::param("scale");
        assert_eq!(value.resolve(&BTreeMap::new()), Err("scale".to_string()));
    }

    #[test]
    fn resolved_values_are_never_reread_as_markers() {
        let value = TemplateValue::from_json(json!(["${a}", 1]));
        let bindings = BTreeMap::from([("a".to_string(), json!("${other}"))]);

        assert_eq!(value.resolve(&bindings).unwrap(), json!(["${other}", 1]));
    }

    #[test]
    fn into_plain_keeps_marker_text_as_data() {
        let value = TemplateValue::from_json(json!({"label": "${foo}", "n": 2}));
        let plain = value.into_plain();

        assert_eq!(plain, TemplateValue::Literal(json!({"label": "${foo}", "n": 2})));
        assert!(plain.references().is_empty());
    }

    #[test]
    fn serde_uses_wire_markers() {
        let value = TemplateValue::List(vec![
            TemplateValue::param("w"),
            TemplateValue::Literal(json!(2)),
        ]);
        let encoded = serde_json::to_string(&value).unwrap();
        assert_eq!(encoded, r#"["${w}",2]"#);

        let decoded: TemplateValue = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, value);
    }
}
