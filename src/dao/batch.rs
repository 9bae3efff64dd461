use indexmap::IndexSet;
use tracing::warn;

use super::{Dao, EMPTY_VALUES};
use crate::builders::statement;
use crate::error::Result;
use crate::traits::{ModifyKind, Record, ToColumnMap};
use crate::types::{ColumnMap, UpdateResult};

impl<T: Record> Dao<T> {
    /// Inserts rows one statement at a time, in order.
    ///
    /// A row refused by storage yields a failed result in its slot and the
    /// loop moves on, so partial success is normal. A connectivity error
    /// stops the batch and is returned.
    pub async fn batch_insert_using_repeat<V: ToColumnMap>(
        &self,
        rows: &[V],
    ) -> Result<Vec<UpdateResult>> {
        let mut results = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let result = match self.insert_object(row).await {
                Ok(result) => result,
                Err(e) if e.is_connectivity() => return Err(e),
                Err(e) => {
                    warn!(table = %self.identity.table, index, error = %e, "batch row failed");
                    UpdateResult::failed(e.to_string())
                }
            };
            results.push(result);
        }
        Ok(results)
    }

    /// Inserts all rows with one multi-row statement.
    ///
    /// Empty rows are dropped. The column list is the union of every row's
    /// columns in first-seen order; a row lacking a column binds `NULL`.
    /// Storage either takes every row or none: a refused statement becomes
    /// a single failed result, while a connectivity error is returned.
    pub async fn batch_insert_using_large_sql<V: ToColumnMap>(
        &self,
        rows: &[V],
    ) -> Result<UpdateResult> {
        let rows: Vec<ColumnMap> = rows
            .iter()
            .map(ToColumnMap::to_column_map)
            .filter(|row| !row.is_empty())
            .collect();
        if rows.is_empty() {
            return Ok(self.reject(EMPTY_VALUES));
        }

        let columns: IndexSet<String> = rows
            .iter()
            .flat_map(|row| row.keys().map(str::to_string))
            .collect();
        let columns: Vec<String> = columns.into_iter().collect();

        let stmt = statement::insert_many(&self.qualified_table(), &columns, &rows);
        match self.modify(ModifyKind::Insert, stmt).await {
            Err(e) if !e.is_connectivity() => {
                warn!(table = %self.identity.table, rows = rows.len(), error = %e, "batch insert failed");
                Ok(UpdateResult::failed(e.to_string()))
            }
            other => other,
        }
    }
}
