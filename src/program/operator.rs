// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::RESERVED_OPERATOR_KEYS;
use crate::program::template::TemplateValue;
use std::collections::BTreeMap;

/// What an operator is: an engine primitive or an instance of a registered prototype.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorKind {
    /// An engine-recognised operator type such as `MovingAverage`
    Primitive { op_type: String },
    /// An instance of the prototype with the given id
    Prototype { prototype: String },
}

/// A named processing node of a program.
///
/// For primitives, `parameters` are the type-specific settings (`window_size`, ...).
/// For prototype instances they are the resolved prototype parameters.
///
/// # Example
/// ```
/// use rtbot_client::program::Operator;
///
/// let ma = Operator::new("ma1", "MovingAverage").with_param("window_size", 3);
/// assert_eq!(ma.op_type(), Some("MovingAverage"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub id: String,
    pub kind: OperatorKind,
    pub parameters: BTreeMap<String, TemplateValue>,
}

impl Operator {
    /// Create a primitive operator of type `op_type`.
    pub fn new(id: impl Into<String>, op_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: OperatorKind::Primitive {
                op_type: op_type.into(),
            },
            parameters: BTreeMap::new(),
        }
    }

    /// Create an operator standing for an instance of `prototype`.
    pub fn instance(
        id: impl Into<String>,
        prototype: impl Into<String>,
        parameters: BTreeMap<String, TemplateValue>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: OperatorKind::Prototype {
                prototype: prototype.into(),
            },
            parameters,
        }
    }

    /// The first parameter of a primitive whose name collides with an operator key
    /// of the wire form (`id`, `type`, `prototype`).
    pub fn reserved_parameter(&self) -> Option<&str> {
        if self.is_instance() {
            return None;
        }
        self.parameters
            .keys()
            .map(String::as_str)
            .find(|name| RESERVED_OPERATOR_KEYS.contains(name))
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn op_type(&self) -> Option<&str> {
        match &self.kind {
            OperatorKind::Primitive { op_type } => Some(op_type),
            OperatorKind::Prototype { .. } => None,
        }
    }

    pub fn prototype(&self) -> Option<&str> {
        match &self.kind {
            OperatorKind::Primitive { .. } => None,
            OperatorKind::Prototype { prototype } => Some(prototype),
        }
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.kind, OperatorKind::Prototype { .. })
    }
}
