// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Flow-diagram export.
//!
//! Programs are drawn with every prototype instance expanded into its operators.
//! Nothing here talks to the engine.

mod labels;
mod mermaid;

pub use labels::operator_label;
pub use mermaid::{Diagram, Edge, Frame, Node, NodeClass};
