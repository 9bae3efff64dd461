use tracing::debug;

use super::{field_clause, Dao};
use crate::builders::{statement, Limit};
use crate::clauses::WhereClause;
use crate::error::Result;
use crate::traits::{Record, ToColumnMap};
use crate::types::{Page, SqlValue};

impl<T: Record> Dao<T> {
    pub async fn count_all(&self) -> Result<i64> {
        self.count_by_where(WhereClause::none()).await
    }

    /// `SELECT COUNT(0)` over `clause`, normalized to `i64` whatever the
    /// driver's native count type.
    pub async fn count_by_where(&self, clause: WhereClause) -> Result<i64> {
        let stmt = statement::count(&self.qualified_table(), &clause);
        self.fetch_count(stmt).await
    }

    pub async fn count_by_example<V: ToColumnMap + ?Sized>(&self, example: &V) -> Result<i64> {
        self.count_by_where(WhereClause::from_example(&example.to_column_map()))
            .await
    }

    pub async fn count_by_field(&self, field: &str, value: impl Into<SqlValue>) -> Result<i64> {
        self.count_by_where(field_clause(field, value)?).await
    }

    pub async fn exists<V: ToColumnMap + ?Sized>(&self, example: &V) -> Result<bool> {
        Ok(self.count_by_example(example).await? > 0)
    }

    /// One page of the records matching `clause`.
    ///
    /// A negative `page_no` is treated as 0; `page_size` is normalized by
    /// [`DaoConfig::clamp_page_size`](crate::DaoConfig::clamp_page_size).
    /// The total is counted first and the row query is skipped when it is 0.
    pub async fn find_page(
        &self,
        page_no: i64,
        page_size: i64,
        clause: WhereClause,
        order_by: &str,
    ) -> Result<Page<T>> {
        let page_no = page_no.max(0) as u64;
        let page_size = self.config.clamp_page_size(page_size);
        let offset = page_no.saturating_mul(page_size);

        let total_count = self.count_by_where(clause.clone()).await?;

        let mut records = if total_count > 0 {
            let stmt = statement::select(
                &self.qualified_table(),
                &self.identity.select_fields,
                &clause,
                order_by,
                Some(Limit {
                    offset,
                    count: page_size,
                }),
            );
            self.fetch(stmt).await?
        } else {
            debug!(table = %self.identity.table, "empty count, skipping row query");
            Vec::new()
        };
        records.truncate(usize::try_from(page_size).unwrap_or(usize::MAX));

        Ok(Page {
            records,
            total_count,
            page_no,
            page_size,
        })
    }

    pub async fn find_page_by_example<V: ToColumnMap + ?Sized>(
        &self,
        page_no: i64,
        page_size: i64,
        example: &V,
        order_by: &str,
    ) -> Result<Page<T>> {
        let clause = WhereClause::from_example(&example.to_column_map());
        self.find_page(page_no, page_size, clause, order_by).await
    }
}
