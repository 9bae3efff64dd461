//! Conversion between records and column/value data.

use heck::ToSnakeCase;

use crate::error::Result;
use crate::traits::Record;
use crate::types::{ColumnMap, QueryResult, RawQueryResult, Row};

/// Maps every row of a raw result onto `T`.
///
/// The first row that fails to map aborts the whole conversion; a schema
/// mismatch is reported, never papered over.
pub fn rows_to_records<T: Record>(raw: RawQueryResult) -> Result<Vec<T>> {
    map_rows(raw, T::from_row)
}

/// Maps every row of a raw result through `map`, stopping at the first
/// failure.
pub fn map_rows<T, F>(raw: RawQueryResult, map: F) -> Result<Vec<T>>
where
    F: Fn(&Row) -> Result<T>,
{
    QueryResult::from_raw(raw).rows().iter().map(map).collect()
}

/// Projects a record onto columns.
///
/// With `underline_keys` field names are converted to snake_case
/// (`createdAt` becomes `created_at`). With `ignore_nulls` fields holding
/// `NULL` are left out. Output order follows the record's field order.
pub fn record_to_column_map<T: Record>(
    record: &T,
    underline_keys: bool,
    ignore_nulls: bool,
) -> ColumnMap {
    record
        .fields()
        .into_iter()
        .filter(|(_, value)| !(ignore_nulls && value.is_null()))
        .map(|(name, value)| {
            let column = if underline_keys {
                name.to_snake_case()
            } else {
                name.to_string()
            };
            (column, value)
        })
        .collect()
}
