use super::{field_clause, Dao, EMPTY_VALUES};
use crate::builders::statement;
use crate::clauses::WhereClause;
use crate::error::Result;
use crate::mapper::record_to_column_map;
use crate::traits::{ModifyKind, Record, ToColumnMap};
use crate::types::{SqlValue, UpdateResult};

impl<T: Record> Dao<T> {
    /// `` INSERT INTO t (`a`,..) VALUES (?,..) ``. Empty values are rejected
    /// without touching storage.
    pub async fn insert_object<V: ToColumnMap + ?Sized>(&self, values: &V) -> Result<UpdateResult> {
        let values = values.to_column_map();
        if values.is_empty() {
            return Ok(self.reject(EMPTY_VALUES));
        }
        let stmt = statement::insert(&self.qualified_table(), values);
        self.modify(ModifyKind::Insert, stmt).await
    }

    /// Inserts a record with explicit projection flags: `underline_keys`
    /// snake_cases field names, `ignore_nulls` leaves out `NULL` fields.
    /// [`insert_object`](Self::insert_object) uses both.
    pub async fn insert_record_with<R: Record>(
        &self,
        record: &R,
        underline_keys: bool,
        ignore_nulls: bool,
    ) -> Result<UpdateResult> {
        self.insert_object(&record_to_column_map(record, underline_keys, ignore_nulls))
            .await
    }

    pub async fn update_by_id<V: ToColumnMap + ?Sized>(
        &self,
        values: &V,
        id: impl Into<SqlValue>,
    ) -> Result<UpdateResult> {
        self.update_by_where(values, WhereClause::eq("id", id)).await
    }

    /// `` UPDATE t SET `a`=?,.. WHERE .. ``; SET arguments bind before the
    /// clause's arguments. Empty values are rejected without touching
    /// storage.
    pub async fn update_by_where<V: ToColumnMap + ?Sized>(
        &self,
        values: &V,
        clause: WhereClause,
    ) -> Result<UpdateResult> {
        let values = values.to_column_map();
        if values.is_empty() {
            return Ok(self.reject(EMPTY_VALUES));
        }
        let stmt = statement::update(&self.qualified_table(), values, &clause);
        self.modify(ModifyKind::Update, stmt).await
    }

    pub async fn update_by_field<V: ToColumnMap + ?Sized>(
        &self,
        values: &V,
        field: &str,
        value: impl Into<SqlValue>,
    ) -> Result<UpdateResult> {
        match field_clause(field, value) {
            Ok(clause) => self.update_by_where(values, clause).await,
            Err(e) => Ok(self.reject(&e.to_string())),
        }
    }

    pub async fn delete_by_id(&self, id: impl Into<SqlValue>) -> Result<UpdateResult> {
        self.delete_by_where(WhereClause::eq("id", id)).await
    }

    /// `DELETE FROM t WHERE ..`. An empty clause deletes every row.
    pub async fn delete_by_where(&self, clause: WhereClause) -> Result<UpdateResult> {
        let stmt = statement::delete(&self.qualified_table(), &clause);
        self.modify(ModifyKind::Delete, stmt).await
    }

    /// Deletes the rows equal to `example` on every populated field. Like
    /// [`find_by_example`](Self::find_by_example), an empty example is
    /// unconstrained and deletes every row.
    pub async fn delete_by_example<V: ToColumnMap + ?Sized>(
        &self,
        example: &V,
    ) -> Result<UpdateResult> {
        self.delete_by_where(WhereClause::from_example(&example.to_column_map()))
            .await
    }

    pub async fn delete_by_field(
        &self,
        field: &str,
        value: impl Into<SqlValue>,
    ) -> Result<UpdateResult> {
        match field_clause(field, value) {
            Ok(clause) => self.delete_by_where(clause).await,
            Err(e) => Ok(self.reject(&e.to_string())),
        }
    }

    pub async fn save_or_update_by_id<V: ToColumnMap + ?Sized>(
        &self,
        values: &V,
        id: impl Into<SqlValue>,
    ) -> Result<UpdateResult> {
        self.save_or_update(values, WhereClause::eq("id", id)).await
    }

    /// Inserts `values` when nothing matches `clause`, otherwise updates the
    /// matching rows.
    ///
    /// Probe and write are separate statements: two callers racing on the
    /// same clause can both see no match and both insert.
    pub async fn save_or_update<V: ToColumnMap + ?Sized>(
        &self,
        values: &V,
        clause: WhereClause,
    ) -> Result<UpdateResult> {
        let values = values.to_column_map();
        if values.is_empty() {
            return Ok(self.reject(EMPTY_VALUES));
        }
        if self.find_by_where(clause.clone()).await?.is_empty() {
            self.insert_object(&values).await
        } else {
            self.update_by_where(&values, clause).await
        }
    }
}
