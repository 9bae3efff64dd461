use std::fmt;

use chrono::NaiveDateTime;

use crate::error::{DaoError, Result};

/// Represents a SQL parameter or cell value in a driver-agnostic way.
/// Drivers are responsible for converting these to their native types.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Bool(bool),
    Timestamp(NaiveDateTime),
    Bytes(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Name of the variant, used in mapping error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Text(_) => "text",
            SqlValue::Int32(_) => "int32",
            SqlValue::Int64(_) => "int64",
            SqlValue::Float64(_) => "float64",
            SqlValue::Bool(_) => "bool",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::Bytes(_) => "bytes",
        }
    }

    /// Normalizes the scalar of a `COUNT` query to `i64`.
    ///
    /// Drivers disagree on the native type of a count: PostgreSQL hands back
    /// `int8`, other backends a narrower integer, a decimal or even text.
    pub fn to_count(&self, column: &str) -> Result<i64> {
        let mismatch = || DaoError::TypeMismatch {
            column: column.to_string(),
            expected: "count",
            found: self.kind(),
        };
        match self {
            SqlValue::Int64(n) => Ok(*n),
            SqlValue::Int32(n) => Ok(i64::from(*n)),
            SqlValue::Float64(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
            SqlValue::Text(s) => s.trim().parse::<i64>().map_err(|_| mismatch()),
            _ => Err(mismatch()),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Text(s) => f.write_str(s),
            SqlValue::Int32(n) => write!(f, "{n}"),
            SqlValue::Int64(n) => write!(f, "{n}"),
            SqlValue::Float64(n) => write!(f, "{n}"),
            SqlValue::Bool(b) => write!(f, "{b}"),
            SqlValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            SqlValue::Bytes(bytes) => {
                f.write_str("0x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::Text(value.clone())
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int32(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int64(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float64(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(value: NaiveDateTime) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        SqlValue::Bytes(value)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(value: &[u8]) -> Self {
        SqlValue::Bytes(value.to_vec())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

/// Conversion from a cell value into a record field.
///
/// Integer widening (`int32` into `i64`, integers into `f64`) is accepted;
/// everything else must match exactly. `Option<T>` accepts `NULL`.
pub trait FromSqlValue: Sized {
    fn from_sql_value(column: &str, value: &SqlValue) -> Result<Self>;
}

fn mismatch(column: &str, expected: &'static str, value: &SqlValue) -> DaoError {
    DaoError::TypeMismatch {
        column: column.to_string(),
        expected,
        found: value.kind(),
    }
}

impl FromSqlValue for String {
    fn from_sql_value(column: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Text(s) => Ok(s.clone()),
            other => Err(mismatch(column, "text", other)),
        }
    }
}

impl FromSqlValue for i32 {
    fn from_sql_value(column: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Int32(n) => Ok(*n),
            SqlValue::Int64(n) => i32::try_from(*n).map_err(|_| mismatch(column, "int32", value)),
            other => Err(mismatch(column, "int32", other)),
        }
    }
}

impl FromSqlValue for i64 {
    fn from_sql_value(column: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Int64(n) => Ok(*n),
            SqlValue::Int32(n) => Ok(i64::from(*n)),
            other => Err(mismatch(column, "int64", other)),
        }
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(column: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Float64(n) => Ok(*n),
            SqlValue::Int32(n) => Ok(f64::from(*n)),
            SqlValue::Int64(n) => Ok(*n as f64),
            other => Err(mismatch(column, "float64", other)),
        }
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(column: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Bool(b) => Ok(*b),
            other => Err(mismatch(column, "bool", other)),
        }
    }
}

impl FromSqlValue for NaiveDateTime {
    fn from_sql_value(column: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Timestamp(ts) => Ok(*ts),
            other => Err(mismatch(column, "timestamp", other)),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(column: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Bytes(b) => Ok(b.clone()),
            other => Err(mismatch(column, "bytes", other)),
        }
    }
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(_column: &str, value: &SqlValue) -> Result<Self> {
        Ok(value.clone())
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(column: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(column, other).map(Some),
        }
    }
}
