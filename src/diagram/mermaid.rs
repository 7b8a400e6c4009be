// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::diagram::labels::operator_label;
use crate::errors::ProgramError;
use crate::program::{expand, Program};
use std::fmt;

const INDENT: &str = "    ";

/// Visual class of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    Plain,
    Entry,
    Output,
}

impl NodeClass {
    fn suffix(self) -> &'static str {
        match self {
            NodeClass::Plain => "",
            NodeClass::Entry => ":::entry",
            NodeClass::Output => ":::output",
        }
    }
}

/// An expanded operator as drawn.
///
/// # Fields
/// * `id` - Scoped operator id (`outer::inner`)
/// * `label` - Abbreviated type and key parameters
/// * `rank` - 0 for top-level operators, +1 per enclosing instance
/// * `class` - Entry/output highlighting
/// * `parent` - Scoped id of the enclosing instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub rank: usize,
    pub class: NodeClass,
    pub parent: Option<String>,
}

/// A prototype instance, drawn as a subgraph around its operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: String,
    pub prototype: String,
    pub rank: usize,
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    /// `fromPort:toPort`
    pub label: String,
}

/// A drawable view of a program with every prototype instance expanded.
///
/// # Example
/// ```
/// use rtbot_client::diagram::Diagram;
/// use rtbot_client::program::{Operator, Program};
/// use rtbot_client::traits::PermissiveValidator;
/// use std::sync::Arc;
///
/// let mut program = Program::new(Arc::new(PermissiveValidator));
/// program.add_operator(Operator::new("in1", "Input"))?;
/// program.add_operator(Operator::new("ma1", "MovingAverage").with_param("window_size", 3))?;
/// program.connect("in1", "ma1")?;
///
/// let text = Diagram::from_program(&program)?.to_mermaid();
/// assert!(text.contains("in1 -->|o1:i1| ma1"));
/// # Ok::<(), rtbot_client::errors::ProgramError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    pub nodes: Vec<Node>,
    pub frames: Vec<Frame>,
    pub edges: Vec<Edge>,
}

impl Diagram {
    pub fn from_program(program: &Program) -> Result<Self, ProgramError> {
        let graph = expand(program)?;

        let nodes = graph
            .operators
            .iter()
            .map(|op| Node {
                id: op.id.clone(),
                label: operator_label(&op.op_type, &op.parameters),
                rank: op.depth,
                class: if graph.is_entry(&op.id) {
                    NodeClass::Entry
                } else if graph.is_output(&op.id) {
                    NodeClass::Output
                } else {
                    NodeClass::Plain
                },
                parent: op.parent.clone(),
            })
            .collect();

        let frames = graph
            .instances
            .iter()
            .map(|frame| Frame {
                id: frame.id.clone(),
                prototype: frame.prototype.clone(),
                rank: frame.depth,
                parent: frame.parent.clone(),
            })
            .collect();

        let edges = graph
            .connections
            .iter()
            .map(|c| Edge {
                from: c.from.clone(),
                to: c.to.clone(),
                label: format!("{}:{}", c.from_port, c.to_port),
            })
            .collect();

        Ok(Self {
            nodes,
            frames,
            edges,
        })
    }

    /// Render as a Mermaid `flowchart LR` document.
    pub fn to_mermaid(&self) -> String {
        self.to_string()
    }

    fn write_scope(&self, f: &mut fmt::Formatter<'_>, scope: Option<&str>, depth: usize) -> fmt::Result {
        let indent = INDENT.repeat(depth);

        for node in self.nodes.iter().filter(|n| n.parent.as_deref() == scope) {
            writeln!(
                f,
                "{}{}[\"{}\"]{}",
                indent,
                node_id(&node.id),
                escape(&node.label),
                node.class.suffix()
            )?;
        }

        for frame in self.frames.iter().filter(|fr| fr.parent.as_deref() == scope) {
            writeln!(
                f,
                "{}subgraph {}[\"{}: {}\"]",
                indent,
                node_id(&frame.id),
                escape(&frame.id),
                escape(&frame.prototype)
            )?;
            self.write_scope(f, Some(&frame.id), depth + 1)?;
            writeln!(f, "{}end", indent)?;
        }
        Ok(())
    }
}

impl fmt::Display for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "flowchart LR")?;
        writeln!(f, "{}classDef entry fill:#d5f5e3,stroke:#1e8449", INDENT)?;
        writeln!(f, "{}classDef output fill:#fdebd0,stroke:#b9770e", INDENT)?;
        self.write_scope(f, None, 1)?;
        for edge in &self.edges {
            writeln!(
                f,
                "{}{} -->|{}| {}",
                INDENT,
                node_id(&edge.from),
                edge.label,
                node_id(&edge.to)
            )?;
        }
        Ok(())
    }
}

/// Mermaid node ids allow only word characters. `_` is doubled and any other
/// character becomes `_<hex code>_`, so distinct operator ids never share a node id.
fn node_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => out.push(c),
            '_' => out.push_str("__"),
            other => out.push_str(&format!("_{:x}_", other as u32)),
        }
    }
    out
}

fn escape(text: &str) -> String {
    text.replace('"', "#quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{
        Connection, FixedId, Operator, ParameterType, PortRef, PrototypeDefinition,
        PrototypeParameter, TemplateValue,
    };
    use crate::traits::PermissiveValidator;
    use serde_json::json;
    use std::sync::Arc;

    fn smoothing_program() -> Program {
        let mut p = Program::builder(Arc::new(PermissiveValidator)).build_with(&FixedId::new("p"));
        p.add_prototype_definition(
            "smooth",
            PrototypeDefinition {
                parameters: vec![PrototypeParameter::required("window", ParameterType::Number)],
                operators: vec![
                    Operator::new("ma", "MovingAverage")
                        .with_param("window_size", TemplateValue::param("window")),
                    Operator::new("sc", "Scale").with_param("value", 2.0),
                ],
                connections: vec![Connection::new("ma", "sc")],
                entry: PortRef::new("ma"),
                output: PortRef::new("sc"),
            },
        )
        .unwrap();
        p.add_operator(Operator::new("in1", "Input")).unwrap();
        p.instantiate_prototype("s1", "smooth", [("window", json!(4))])
            .unwrap();
        p.connect("in1", "s1").unwrap();
        p.add_output("s1", ["o1"]).unwrap();
        p
    }

    #[test]
    fn nodes_carry_rank_class_and_label() {
        let diagram = Diagram::from_program(&smoothing_program()).unwrap();

        let summary: Vec<(&str, &str, usize, NodeClass)> = diagram
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.label.as_str(), n.rank, n.class))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("in1", "IN", 0, NodeClass::Entry),
                ("s1::ma", "MA(4)", 1, NodeClass::Plain),
                ("s1::sc", "SCALE(2.0)", 1, NodeClass::Output),
            ]
        );
        assert_eq!(diagram.frames.len(), 1);
        assert_eq!(diagram.frames[0].prototype, "smooth");
    }

    #[test]
    fn renders_flowchart_with_subgraphs() {
        let text = smoothing_program().to_mermaid().unwrap();

        let expected = "\
flowchart LR
    classDef entry fill:#d5f5e3,stroke:#1e8449
    classDef output fill:#fdebd0,stroke:#b9770e
    in1[\"IN\"]:::entry
    subgraph s1[\"s1: smooth\"]
        s1_3a__3a_ma[\"MA(4)\"]
        s1_3a__3a_sc[\"SCALE(2.0)\"]:::output
    end
    s1_3a__3a_ma -->|o1:i1| s1_3a__3a_sc
    in1 -->|o1:i1| s1_3a__3a_ma
";
        assert_eq!(text, expected);
    }

    #[test]
    fn edge_labels_show_ports() {
        let mut p = Program::new(Arc::new(PermissiveValidator));
        p.add_operator(Operator::new("in1", "Input")).unwrap();
        p.add_operator(Operator::new("j", "Join")).unwrap();
        p.add_connection(Connection::new("in1", "j").to_port("i2")).unwrap();

        let diagram = Diagram::from_program(&p).unwrap();
        assert_eq!(diagram.edges[0].label, "o1:i2");
    }

    #[test]
    fn empty_program_renders_header_only() {
        let p = Program::new(Arc::new(PermissiveValidator));
        let text = Diagram::from_program(&p).unwrap().to_mermaid();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("flowchart LR\n"));
    }

    #[test]
    fn node_ids_are_sanitized() {
        assert_eq!(node_id("a::b-c"), "a_3a__3a_b_2d_c");
        assert_ne!(node_id("a::b"), node_id("a__b"));
        assert_ne!(node_id("a_3a_b"), node_id("a:b"));
        assert_eq!(escape("say \"hi\""), "say #quot;hi#quot;");
    }
}
