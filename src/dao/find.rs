use tracing::debug;

use super::{field_clause, Dao};
use crate::builders::fragment::{filter_ids, DefaultIdCharFilter, IdCharFilter};
use crate::builders::{statement, Limit};
use crate::clauses::WhereClause;
use crate::error::{DaoError, Result};
use crate::traits::{Record, ToColumnMap};
use crate::types::SqlValue;

impl<T: Record> Dao<T> {
    /// `` WHERE `id` = ? ``, first match only.
    pub async fn find_by_id(&self, id: impl Into<SqlValue>) -> Result<Option<T>> {
        self.find_one_by_where(WhereClause::eq("id", id)).await
    }

    /// First record matching `clause`, fetched with `LIMIT 0,1`.
    pub async fn find_one_by_where(&self, clause: WhereClause) -> Result<Option<T>> {
        let stmt = statement::select(
            &self.qualified_table(),
            &self.identity.select_fields,
            &clause,
            "",
            Some(Limit {
                offset: 0,
                count: 1,
            }),
        );
        Ok(self.fetch(stmt).await?.into_iter().next())
    }

    pub async fn find_by_where(&self, clause: WhereClause) -> Result<Vec<T>> {
        self.find_by_where_ordered(clause, "").await
    }

    /// Like [`find_by_where`](Self::find_by_where) with a trusted `ORDER BY`
    /// expression.
    pub async fn find_by_where_ordered(
        &self,
        clause: WhereClause,
        order_by: &str,
    ) -> Result<Vec<T>> {
        let stmt = statement::select(
            &self.qualified_table(),
            &self.identity.select_fields,
            &clause,
            order_by,
            None,
        );
        self.fetch(stmt).await
    }

    pub async fn find_all(&self) -> Result<Vec<T>> {
        self.find_by_where(WhereClause::none()).await
    }

    /// Records whose `id` is in `ids`, filtered through the default id
    /// allow-list.
    pub async fn find_by_id_list<I>(&self, ids: I) -> Result<Vec<T>>
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        self.find_by_id_list_with("id", ids, &DefaultIdCharFilter)
            .await
    }

    /// Records whose `id_field` is in `ids`.
    ///
    /// Nulls, duplicates, empty ids and ids with a character outside
    /// `filter` are dropped without error. The survivors are rendered as
    /// literals in an `IN (...)` list; if none survive, no query is issued.
    pub async fn find_by_id_list_with<I>(
        &self,
        id_field: &str,
        ids: I,
        filter: &dyn IdCharFilter,
    ) -> Result<Vec<T>>
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        let id_field = id_field.trim();
        if id_field.is_empty() {
            return Err(DaoError::InvalidArgument(
                "id field name can not be empty".to_string(),
            ));
        }
        let ids = filter_ids(ids, filter);
        if ids.is_empty() {
            debug!(table = %self.identity.table, "id list empty after filtering");
            return Ok(Vec::new());
        }
        let stmt = statement::select_in(
            &self.qualified_table(),
            &self.identity.select_fields,
            id_field,
            &ids,
        );
        self.fetch(stmt).await
    }

    /// Equality on every populated field of `example`. An empty example
    /// matches everything.
    pub async fn find_by_example<V: ToColumnMap + ?Sized>(&self, example: &V) -> Result<Vec<T>> {
        self.find_by_where(WhereClause::from_example(&example.to_column_map()))
            .await
    }

    pub async fn find_one_by_field(
        &self,
        field: &str,
        value: impl Into<SqlValue>,
    ) -> Result<Option<T>> {
        self.find_one_by_where(field_clause(field, value)?).await
    }

    pub async fn find_list_by_field(
        &self,
        field: &str,
        value: impl Into<SqlValue>,
    ) -> Result<Vec<T>> {
        self.find_by_where(field_clause(field, value)?).await
    }
}
