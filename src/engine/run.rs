// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Run sessions: driving a table of time-series rows through a live engine instance.
//!
//! A [`Run`] binds one program to one data table. The engine instance is created
//! lazily on the first step and keyed by the program id. Each input row becomes one
//! message per routed column followed by one processing pass, and each pass becomes
//! one result row.
//!
//! # State machine
//!
//! ```text
//! Uninitialized --step--> Active --source exhausted (aggregate)--> Drained
//!                           |                                         |
//!                           +------------------release----------------+--> Released
//! ```
//!
//! A failed instance creation leaves the session `Uninitialized`. `Released` is
//! terminal. Debug sessions stay `Active` after the source is exhausted so the
//! instance can be inspected; they must be released by the caller.

use crate::config::consts::TIME_COLUMN;
use crate::config::RunOptions;
use crate::engine::collector::ColumnPlan;
use crate::engine::fragment::Message;
use crate::engine::table::Table;
use crate::errors::{EngineError, RunError};
use crate::observability::messages::run::{
    InstanceCreated, InstanceCreationFailed, InstanceLeaked, InstanceReleased, MissingValue,
    PortNotAccepted, ReleaseFailed, SessionDrained, StepCompleted, StepStarted, UnmappedColumn,
};
use crate::observability::messages::StructuredLog;
use crate::program::{expand, Program};
use crate::traits::Engine;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::Instrument;

/// Lifecycle state of a [`Run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No engine instance exists yet
    Uninitialized,
    /// The engine instance is live
    Active,
    /// The source was consumed and the instance torn down
    Drained,
    /// Released by the caller; no further steps are possible
    Released,
}

/// A non-fatal condition noticed while setting up or driving a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunWarning {
    /// A data column without explicit mapping, sent to the port of the same name
    UnmappedColumn { column: String },
    /// A routed port the engine does not list among its entry ports
    PortNotAccepted { port: String },
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunWarning::UnmappedColumn { column } => {
                write!(f, "column '{}' is not mapped; using it as the port id", column)
            }
            RunWarning::PortNotAccepted { port } => {
                write!(f, "port '{}' is not an entry port of the program", port)
            }
        }
    }
}

/// A data column and the engine port its values are sent to.
#[derive(Debug, Clone)]
struct Route {
    column: usize,
    port: String,
}

/// Future returned by the closure given to [`Run::scoped`].
pub type ScopedFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RunError>> + Send + 'a>>;

/// An execution session of one program over one data table.
///
/// # Example
/// ```no_run
/// use rtbot_client::config::RunOptions;
/// use rtbot_client::engine::{Run, Table};
/// use rtbot_client::program::Program;
/// use rtbot_client::traits::Engine;
/// use std::sync::Arc;
///
/// async fn smooth(engine: Arc<dyn Engine>, program: &Program) -> Result<Table, rtbot_client::errors::RunError> {
///     let data = Table::new(vec![1, 2, 3]).with_values("price", vec![10.0, 15.0, 20.0])?;
///     let options = RunOptions::aggregate().map_column("price", "i1");
///
///     Run::new(engine, program, data, options)?
///         .scoped(|run| Box::pin(async move { run.run().await }))
///         .await
/// }
/// ```
pub struct Run {
    engine: Arc<dyn Engine>,
    program_id: String,
    program_json: String,
    operator_count: usize,
    data: Table,
    routes: Vec<Route>,
    plan: ColumnPlan,
    options: RunOptions,
    current_index: usize,
    state: RunState,
    warnings: Vec<RunWarning>,
}

impl Run {
    /// Prepare a session. Column routes and result columns are resolved here, once;
    /// the engine is not contacted.
    pub fn new(
        engine: Arc<dyn Engine>,
        program: &Program,
        data: Table,
        options: RunOptions,
    ) -> Result<Self, RunError> {
        let program_json = program.to_json()?;
        let graph = expand(program)?;
        let plan = ColumnPlan::new(&graph, options.mode, &options.output_names);

        let mut warnings = Vec::new();
        let routes = data
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, column)| column.name != TIME_COLUMN)
            .map(|(index, column)| {
                let port = match options.column_mapping.get(&column.name) {
                    Some(port) => port.clone(),
                    None => {
                        UnmappedColumn {
                            column: &column.name,
                        }
                        .log();
                        warnings.push(RunWarning::UnmappedColumn {
                            column: column.name.clone(),
                        });
                        column.name.clone()
                    }
                };
                Route {
                    column: index,
                    port,
                }
            })
            .collect();

        Ok(Self {
            engine,
            program_id: program.id().to_string(),
            program_json,
            operator_count: graph.operators.len(),
            data,
            routes,
            plan,
            options,
            current_index: 0,
            state: RunState::Uninitialized,
            warnings,
        })
    }

    pub fn program_id(&self) -> &str {
        &self.program_id
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Whether an engine instance is currently live for this session.
    pub fn is_initialized(&self) -> bool {
        self.state == RunState::Active
    }

    /// Number of input rows processed so far.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.data.len()
    }

    pub fn warnings(&self) -> &[RunWarning] {
        &self.warnings
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Names of the result columns, in order.
    pub fn columns(&self) -> &[String] {
        self.plan.columns()
    }

    async fn initialize(&mut self) -> Result<(), RunError> {
        if let Err(e) = self
            .engine
            .create_instance(&self.program_id, &self.program_json)
            .await
        {
            let message = e.to_string();
            InstanceCreationFailed {
                program_id: &self.program_id,
                reason: &message,
            }
            .log();
            return Err(RunError::EngineCreation {
                program_id: self.program_id.clone(),
                message,
            });
        }

        self.state = RunState::Active;
        InstanceCreated {
            program_id: &self.program_id,
            operator_count: self.operator_count,
        }
        .log();

        let accepted = self.engine.entry_ports(&self.program_id).await?;
        for route in &self.routes {
            let known = self.warnings.iter().any(
                |w| matches!(w, RunWarning::PortNotAccepted { port } if *port == route.port),
            );
            if !accepted.contains(&route.port) && !known {
                PortNotAccepted {
                    program_id: &self.program_id,
                    port: &route.port,
                }
                .log();
                self.warnings.push(RunWarning::PortNotAccepted {
                    port: route.port.clone(),
                });
            }
        }
        Ok(())
    }

    /// Process up to `limit` rows (all remaining rows when `None`).
    ///
    /// Returns one result row per processed input row. Stepping an exhausted
    /// session returns an empty table without contacting the engine.
    pub async fn step(&mut self, limit: Option<usize>) -> Result<Table, RunError> {
        if self.state == RunState::Released {
            return Err(RunError::SessionClosed(self.program_id.clone()));
        }
        if self.is_exhausted() {
            return Ok(self.plan.empty_table());
        }
        if self.state == RunState::Uninitialized {
            self.initialize().await?;
        }

        let start = self.current_index;
        let end = match limit {
            Some(n) => (start + n).min(self.data.len()),
            None => self.data.len(),
        };
        let span = StepStarted {
            program_id: &self.program_id,
            from_row: start,
            rows: end - start,
        }
        .span("step");

        let table = self.process_rows(start, end).instrument(span).await?;

        StepCompleted {
            program_id: &self.program_id,
            rows: end - start,
            current_index: self.current_index,
        }
        .log();

        if self.is_exhausted() && !self.options.mode.is_debug() {
            self.drain().await?;
        }
        Ok(table)
    }

    async fn process_rows(&mut self, start: usize, end: usize) -> Result<Table, RunError> {
        let mut table = self.plan.empty_table();

        for row in start..end {
            if let Err(source) = self.process_row(row, &mut table).await {
                return Err(RunError::StepFailed {
                    partial: table,
                    source,
                });
            }
        }

        Ok(table)
    }

    /// Send one input row, run one pass and fold it into `table`. `current_index`
    /// only moves once the row's result is in the table.
    async fn process_row(&mut self, row: usize, table: &mut Table) -> Result<(), EngineError> {
        let time = self.data.time()[row];
        for route in &self.routes {
            let column = &self.data.columns()[route.column];
            match column.values[row] {
                Some(value) => {
                    self.engine
                        .submit_message(&self.program_id, &route.port, Message::new(time, value))
                        .await?
                }
                None => MissingValue {
                    column: &column.name,
                    row,
                }
                .log(),
            }
        }

        let output = self
            .engine
            .run_pass(&self.program_id, self.options.mode)
            .await?;
        self.plan.fold(table, time, &output);
        self.current_index = row + 1;
        Ok(())
    }

    async fn drain(&mut self) -> Result<(), RunError> {
        self.engine.delete_instance(&self.program_id).await?;
        self.state = RunState::Drained;
        SessionDrained {
            program_id: &self.program_id,
            rows_processed: self.current_index,
        }
        .log();
        Ok(())
    }

    /// Step through the rest of the source in batches of `batch_size` rows and
    /// return all result rows.
    ///
    /// On a mid-step engine failure the `StepFailed` error carries every result row
    /// produced by this call.
    pub async fn run(&mut self) -> Result<Table, RunError> {
        let batch = self.options.batch_size.filter(|n| *n > 0);
        let mut result = self.plan.empty_table();
        loop {
            match self.step(batch).await {
                Ok(table) => result.append(table),
                Err(RunError::StepFailed { partial, source }) => {
                    result.append(partial);
                    return Err(RunError::StepFailed {
                        partial: result,
                        source,
                    });
                }
                Err(e) => return Err(e),
            }
            if self.is_exhausted() {
                return Ok(result);
            }
        }
    }

    /// Tear down the engine instance if one is live. Safe to call repeatedly.
    ///
    /// The session is closed afterwards even when the engine fails to delete.
    pub async fn release(&mut self) -> Result<(), RunError> {
        let was_active = self.state == RunState::Active;
        self.state = RunState::Released;
        if !was_active {
            return Ok(());
        }

        if let Err(e) = self.engine.delete_instance(&self.program_id).await {
            ReleaseFailed {
                program_id: &self.program_id,
                reason: &e.to_string(),
            }
            .log();
            return Err(e.into());
        }

        InstanceReleased {
            program_id: &self.program_id,
            rows_processed: self.current_index,
        }
        .log();
        Ok(())
    }

    /// Run `f` against this session and release it afterwards, whatever `f`
    /// returned. An error from `f` takes precedence over a release error.
    pub async fn scoped<T, F>(mut self, f: F) -> Result<T, RunError>
    where
        F: for<'a> FnOnce(&'a mut Run) -> ScopedFuture<'a, T>,
    {
        let outcome = f(&mut self).await;
        let released = self.release().await;
        match (outcome, released) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
            (Ok(value), Ok(())) => Ok(value),
        }
    }
}

impl Drop for Run {
    fn drop(&mut self) {
        if self.state != RunState::Active {
            return;
        }

        let cleanup_scheduled = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let engine = Arc::clone(&self.engine);
                let program_id = self.program_id.clone();
                handle.spawn(async move {
                    if let Err(e) = engine.delete_instance(&program_id).await {
                        ReleaseFailed {
                            program_id: &program_id,
                            reason: &e.to_string(),
                        }
                        .log();
                    }
                });
                true
            }
            Err(_) => false,
        };

        InstanceLeaked {
            program_id: &self.program_id,
            cleanup_scheduled,
        }
        .log();
    }
}
