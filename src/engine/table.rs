// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Columnar time-series tables used both as run input and as run result.

use crate::config::consts::TIME_COLUMN;
use crate::errors::SchemaError;

/// Largest time that survives the trip through an `f64` column unchanged (2^53).
const MAX_EXACT_TIME: f64 = 9_007_199_254_740_992.0;

/// A named column; `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// A `time` column plus named value columns of equal length.
///
/// # Example
/// ```
/// use rtbot_client::engine::Table;
///
/// let table = Table::new(vec![1, 2, 3])
///     .with_values("price", vec![10.0, 15.0, 20.0])?;
///
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.value("price", 1), Some(15.0));
/// # Ok::<(), rtbot_client::errors::SchemaError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    time: Vec<u64>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(time: Vec<u64>) -> Self {
        Self {
            time,
            columns: Vec::new(),
        }
    }

    /// An empty table with the given value columns.
    pub fn with_column_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            time: Vec::new(),
            columns: names
                .into_iter()
                .map(|name| Column {
                    name: name.into(),
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    /// Build a table from loosely typed columns, one of which must be `time`.
    ///
    /// Times must be present on every row, integral, non-negative and at most 2^53.
    pub fn from_columns(columns: Vec<(String, Vec<Option<f64>>)>) -> Result<Self, SchemaError> {
        let time_index = columns
            .iter()
            .position(|(name, _)| name == TIME_COLUMN)
            .ok_or_else(|| SchemaError::MissingTimeColumn(TIME_COLUMN.to_string()))?;

        let mut columns = columns;
        let (_, raw_time) = columns.remove(time_index);
        let time = raw_time
            .iter()
            .enumerate()
            .map(|(row, t)| match t {
                Some(t) if (0.0..=MAX_EXACT_TIME).contains(t) && t.fract() == 0.0 => Ok(*t as u64),
                _ => Err(SchemaError::InvalidTime { row }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        columns
            .into_iter()
            .try_fold(Table::new(time), |table, (name, values)| table.with_column(name, values))
    }

    /// Add a value column. Its length must match the time column.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<Self, SchemaError> {
        let name = name.into();
        if name == TIME_COLUMN || self.column(&name).is_some() {
            return Err(SchemaError::DuplicateColumn(name));
        }
        if values.len() != self.time.len() {
            return Err(SchemaError::LengthMismatch {
                column: name,
                expected: self.time.len(),
                found: values.len(),
            });
        }
        self.columns.push(Column { name, values });
        Ok(self)
    }

    /// Add a value column with no missing values.
    pub fn with_values(self, name: impl Into<String>, values: Vec<f64>) -> Result<Self, SchemaError> {
        self.with_column(name, values.into_iter().map(Some).collect())
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[u64] {
        &self.time
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn value(&self, column: &str, row: usize) -> Option<f64> {
        self.column(column).and_then(|values| values.get(row).copied().flatten())
    }

    /// Add an empty column, back-filled with missing values for existing rows.
    pub(crate) fn add_column(&mut self, name: impl Into<String>) -> usize {
        self.columns.push(Column {
            name: name.into(),
            values: vec![None; self.time.len()],
        });
        self.columns.len() - 1
    }

    /// Append a row; `values` line up with the columns.
    pub(crate) fn push_row(&mut self, time: u64, values: Vec<Option<f64>>) {
        self.time.push(time);
        let mut values = values.into_iter();
        for column in &mut self.columns {
            column.values.push(values.next().flatten());
        }
    }

    /// Append the rows of `other`, aligning columns by name.
    ///
    /// Columns only one side has are filled with missing values on the other.
    pub fn append(&mut self, other: Table) {
        let rows_before = self.len();
        for column in &other.columns {
            if self.column(&column.name).is_none() {
                self.add_column(column.name.clone());
            }
        }

        self.time.extend(other.time.iter().copied());
        for column in &mut self.columns {
            match other.columns.iter().find(|c| c.name == column.name) {
                Some(incoming) => column.values.extend(incoming.values.iter().copied()),
                None => column.values.resize(rows_before + other.time.len(), None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_columns_requires_time() {
        let result = Table::from_columns(vec![("v".to_string(), vec![Some(1.0)])]);
        assert_eq!(result, Err(SchemaError::MissingTimeColumn("time".to_string())));
    }

    #[test]
    fn from_columns_checks_times_and_lengths() {
        let bad_time = Table::from_columns(vec![
            ("time".to_string(), vec![Some(1.0), Some(1.5)]),
            ("v".to_string(), vec![Some(1.0), Some(2.0)]),
        ]);
        assert_eq!(bad_time, Err(SchemaError::InvalidTime { row: 1 }));

        let huge_time = Table::from_columns(vec![("time".to_string(), vec![Some(1.0), Some(1e19)])]);
        assert_eq!(huge_time, Err(SchemaError::InvalidTime { row: 1 }));

        let past_exact = Table::from_columns(vec![("time".to_string(), vec![Some(9_007_199_254_740_994.0)])]);
        assert_eq!(past_exact, Err(SchemaError::InvalidTime { row: 0 }));

        let largest = Table::from_columns(vec![("time".to_string(), vec![Some(9_007_199_254_740_992.0)])]).unwrap();
        assert_eq!(largest.time(), &[9_007_199_254_740_992]);

        let missing_time = Table::from_columns(vec![("time".to_string(), vec![None])]);
        assert_eq!(missing_time, Err(SchemaError::InvalidTime { row: 0 }));

        let short = Table::from_columns(vec![
            ("time".to_string(), vec![Some(1.0), Some(2.0)]),
            ("v".to_string(), vec![Some(1.0)]),
        ]);
        assert_eq!(
            short,
            Err(SchemaError::LengthMismatch {
                column: "v".to_string(),
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn from_columns_keeps_value_columns_in_order() {
        let table = Table::from_columns(vec![
            ("a".to_string(), vec![Some(1.0), None]),
            ("time".to_string(), vec![Some(10.0), Some(20.0)]),
            ("b".to_string(), vec![Some(3.0), Some(4.0)]),
        ])
        .unwrap();

        assert_eq!(table.time(), &[10, 20]);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(table.value("a", 1), None);
        assert_eq!(table.value("b", 1), Some(4.0));
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let table = Table::new(vec![1]).with_values("v", vec![1.0]).unwrap();
        assert_eq!(
            table.clone().with_values("v", vec![2.0]),
            Err(SchemaError::DuplicateColumn("v".to_string()))
        );
        assert_eq!(
            table.with_values("time", vec![2.0]),
            Err(SchemaError::DuplicateColumn("time".to_string()))
        );
    }

    #[test]
    fn append_aligns_columns_by_name() {
        let mut first = Table::new(vec![1]).with_values("a", vec![1.0]).unwrap();
        let second = Table::new(vec![2])
            .with_values("b", vec![2.0])
            .unwrap()
            .with_values("a", vec![3.0])
            .unwrap();

        first.append(second);
        assert_eq!(first.time(), &[1, 2]);
        assert_eq!(first.column("a").unwrap(), &[Some(1.0), Some(3.0)]);
        assert_eq!(first.column("b").unwrap(), &[None, Some(2.0)]);
    }
}
