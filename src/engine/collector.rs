// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Planning of result columns and folding of pass output into rows.

use crate::config::consts::{DEFAULT_FROM_PORT, PORT_SEPARATOR};
use crate::config::RunMode;
use crate::engine::fragment::{last_values, PassOutput};
use crate::engine::table::Table;
use crate::program::{Endpoint, ExpandedGraph};
use std::collections::BTreeMap;

fn column_name(operator: &str, port: &str) -> String {
    format!("{}{}{}", operator, PORT_SEPARATOR, port)
}

/// Which result column each reported operator/port pair lands in.
///
/// The column set is fixed when the plan is made. In debug mode a pair the plan did
/// not foresee is still captured, as a new column back-filled with missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPlan {
    columns: Vec<String>,
    sources: BTreeMap<Endpoint, usize>,
    mode: RunMode,
}

impl ColumnPlan {
    pub fn new(graph: &ExpandedGraph, mode: RunMode, output_names: &BTreeMap<String, String>) -> Self {
        match mode {
            RunMode::Aggregate => Self::aggregate(graph, output_names),
            RunMode::Debug => Self::debug(graph),
        }
    }

    /// One column per declared output port.
    ///
    /// An output on a prototype instance is also fed by the expanded port it
    /// resolves to, so either naming from the engine lands in the same column.
    pub fn aggregate(graph: &ExpandedGraph, output_names: &BTreeMap<String, String>) -> Self {
        let mut plan = Self::empty(RunMode::Aggregate);
        for binding in &graph.outputs {
            let declared = column_name(&binding.declared.operator, &binding.declared.port);
            let name = output_names.get(&declared).cloned().unwrap_or(declared);
            let index = plan.column_index(name);
            plan.sources.insert(binding.declared.clone(), index);
            plan.sources.entry(binding.resolved.clone()).or_insert(index);
        }
        plan
    }

    /// One column per output port of every expanded operator: `o1`, every port it
    /// feeds a connection from, and every declared output port it produces.
    pub fn debug(graph: &ExpandedGraph) -> Self {
        let mut plan = Self::empty(RunMode::Debug);
        for op in &graph.operators {
            let mut ports = vec![DEFAULT_FROM_PORT.to_string()];
            ports.extend(
                graph
                    .connections
                    .iter()
                    .filter(|c| c.from == op.id)
                    .map(|c| c.from_port.clone()),
            );
            ports.extend(
                graph
                    .outputs
                    .iter()
                    .filter(|b| b.resolved.operator == op.id)
                    .map(|b| b.resolved.port.clone()),
            );

            for port in ports {
                let endpoint = Endpoint::new(op.id.clone(), port);
                if !plan.sources.contains_key(&endpoint) {
                    let index = plan.column_index(column_name(&endpoint.operator, &endpoint.port));
                    plan.sources.insert(endpoint, index);
                }
            }
        }
        plan
    }

    fn empty(mode: RunMode) -> Self {
        Self {
            columns: Vec::new(),
            sources: BTreeMap::new(),
            mode,
        }
    }

    fn column_index(&mut self, name: String) -> usize {
        match self.columns.iter().position(|c| *c == name) {
            Some(index) => index,
            None => {
                self.columns.push(name);
                self.columns.len() - 1
            }
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// An empty result table with the planned columns.
    pub fn empty_table(&self) -> Table {
        Table::with_column_names(self.columns.iter().cloned())
    }

    /// Fold one pass into one result row stamped with the input row's `time`.
    ///
    /// When a port reports several messages in the pass, the last one wins.
    pub fn fold(&mut self, table: &mut Table, time: u64, output: &PassOutput) {
        let mut row = vec![None; self.columns.len()];

        for (operator, port, value) in last_values(output) {
            let endpoint = Endpoint::new(operator, port);
            let index = match self.sources.get(&endpoint) {
                Some(index) => *index,
                None if self.mode.is_debug() => {
                    let index = self.column_index(column_name(operator, port));
                    self.sources.insert(endpoint, index);
                    table.add_column(self.columns[index].clone());
                    row.push(None);
                    index
                }
                None => continue,
            };
            row[index] = Some(value);
        }

        table.push_row(time, row);
    }
}
