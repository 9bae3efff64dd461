use std::collections::HashMap;

use heck::ToSnakeCase;

use crate::error::{DaoError, Result};
use crate::types::{FromSqlValue, SqlValue};

/// Driver-agnostic raw result from a database query.
#[derive(Debug, Clone)]
pub struct RawQueryResult {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of values in column order
    pub rows: Vec<Vec<SqlValue>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// A single row result from a query.
/// Values are accessed by column name.
#[derive(Debug, Clone, Default)]
pub struct Row {
    values: HashMap<String, SqlValue>,
}

impl Row {
    /// Creates a new Row from column names and values.
    pub fn new(columns: &[String], values: Vec<SqlValue>) -> Self {
        let values = columns
            .iter()
            .zip(values)
            .map(|(col, val)| (col.clone(), val))
            .collect();
        Self { values }
    }

    /// Looks up the cell for a record field.
    ///
    /// The exact name is tried first, then its snake_case form, so a field
    /// declared as `userName` reads the `user_name` column.
    pub fn value(&self, field: &str) -> Option<&SqlValue> {
        self.values.get(field).or_else(|| {
            let snake = field.to_snake_case();
            if snake == field {
                None
            } else {
                self.values.get(&snake)
            }
        })
    }

    /// Gets a typed value by field name.
    pub fn get<V: FromSqlValue>(&self, field: &str) -> Result<V> {
        let value = self
            .value(field)
            .ok_or_else(|| DaoError::ColumnNotFound(field.to_string()))?;
        V::from_sql_value(field, value)
    }

    /// Returns all column names in this row.
    pub fn columns(&self) -> Vec<&str> {
        self.values.keys().map(|s| s.as_str()).collect()
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of a query execution, containing zero or more rows.
#[derive(Debug)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl QueryResult {
    /// Creates a QueryResult from a RawQueryResult.
    pub fn from_raw(raw: RawQueryResult) -> Self {
        Self {
            columns: raw.columns,
            rows: raw.rows,
        }
    }

    /// Returns the first column of the single row, as produced by
    /// aggregate queries such as `COUNT(0)`.
    pub fn scalar(mut self) -> Result<(String, SqlValue)> {
        if self.rows.len() != 1 {
            return Err(DaoError::UnexpectedRowCount {
                expected: 1,
                actual: self.rows.len(),
            });
        }
        let column = self.columns.first().cloned().unwrap_or_default();
        let value = self
            .rows
            .pop()
            .and_then(|row| row.into_iter().next())
            .ok_or_else(|| DaoError::ColumnNotFound(column.clone()))?;
        Ok((column, value))
    }

    /// Returns all rows from the result.
    pub fn rows(self) -> Vec<Row> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|values| Row::new(&columns, values))
            .collect()
    }

    /// Returns the column names from this result.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of rows in this result.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if this result contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
