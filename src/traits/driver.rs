use async_trait::async_trait;

use crate::error::Result;
use crate::types::{RawQueryResult, SqlValue};

/// Trait for database driver implementations.
/// Drivers are responsible for:
/// - Converting SqlValue parameters to native types
/// - Translating the canonical statement text to their dialect
/// - Executing statements and converting results to RawQueryResult
///
/// Statements arrive with `?` positional placeholders, backtick-quoted
/// identifiers and `LIMIT offset,count` paging.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Execute a statement that returns rows.
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult>;

    /// Execute a row-affecting statement and return the affected row count.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;
}
