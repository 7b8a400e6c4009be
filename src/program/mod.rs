// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Program graph construction.
//!
//! A [`Program`] is built from primitive [`Operator`]s, prototype instances and
//! [`Connection`]s, then serialized for the engine. Prototypes stay unexpanded in the
//! program itself; [`expand`] produces the flat graph when one is needed.
//!
//! # Example
//! ```
//! use rtbot_client::program::{FixedId, Operator, Program};
//! use rtbot_client::traits::PermissiveValidator;
//! use std::sync::Arc;
//!
//! let mut program = Program::builder(Arc::new(PermissiveValidator)).build_with(&FixedId::new("p1"));
//! program
//!     .add_operator(Operator::new("in1", "Input"))?
//!     .add_operator(Operator::new("ma1", "MovingAverage").with_param("window_size", 3))?
//!     .add_operator(Operator::new("out1", "Output"))?
//!     .connect("in1", "ma1")?
//!     .connect("ma1", "out1")?
//!     .add_output("out1", ["o1"])?;
//!
//! assert_eq!(program.entry_operator(), Some("in1"));
//! # Ok::<(), rtbot_client::errors::ProgramError>(())
//! ```

pub mod connection;
pub mod expansion;
pub mod identity;
pub mod model;
pub mod operator;
pub mod prototype;
pub mod serializer;
pub mod template;

pub use connection::Connection;
pub use expansion::{expand, Endpoint, ExpandedGraph, ExpandedOperator, InstanceFrame, OutputBinding};
pub use identity::{FixedId, IdGenerator, RandomIdGenerator};
pub use model::{Program, ProgramBuilder, ProgramMetadata};
pub use operator::{Operator, OperatorKind};
pub use prototype::{
    ParameterType, PortRef, PrototypeDefinition, PrototypeParameter, PrototypeRegistry,
};
pub use serializer::{OperatorDocument, ProgramDocument, PrototypeDocument};
pub use template::TemplateValue;
