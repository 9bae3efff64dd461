use crate::error::Result;
use crate::mapper::record_to_column_map;
use crate::types::{ColumnMap, Row, SqlValue};

/// Static description of a record type mapped to a table.
///
/// # Example
/// ```
/// use daors::{Record, Result, Row, SqlValue};
///
/// struct User {
///     id: i64,
///     user_name: Option<String>,
/// }
///
/// impl Record for User {
///     fn fields(&self) -> Vec<(&'static str, SqlValue)> {
///         vec![
///             ("id", self.id.into()),
///             ("userName", self.user_name.clone().into()),
///         ]
///     }
///
///     fn from_row(row: &Row) -> Result<Self> {
///         Ok(User {
///             id: row.get("id")?,
///             user_name: row.get("userName")?,
///         })
///     }
/// }
/// ```
pub trait Record: Sized + Send {
    /// Field names and values in declaration order. Names may be camelCase;
    /// the mapper converts them to column names.
    fn fields(&self) -> Vec<(&'static str, SqlValue)>;

    /// Builds a record from one result row.
    fn from_row(row: &Row) -> Result<Self>;
}

/// Anything that can be turned into column/value pairs for an example query
/// or a set of new values.
pub trait ToColumnMap {
    fn to_column_map(&self) -> ColumnMap;
}

impl ToColumnMap for ColumnMap {
    fn to_column_map(&self) -> ColumnMap {
        self.clone()
    }
}

/// Records drop absent fields and use snake_case column names.
impl<R: Record> ToColumnMap for R {
    fn to_column_map(&self) -> ColumnMap {
        record_to_column_map(self, true, true)
    }
}
