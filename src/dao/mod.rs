//! The per-table accessor.
//!
//! A [`Dao`] owns a table identity, a connection source, its configuration,
//! an optional row mapper and an optional modification listener. It holds no per-call state, so one
//! instance can serve any number of concurrent callers. Retargeting
//! (`use_table`, `use_schema`, `use_connection`, `use_factory`) always
//! returns a new accessor and leaves the original untouched.

mod batch;
mod count;
mod find;
mod modify;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::builders::fragment::quote_ident;
use crate::builders::Statement;
use crate::clauses::WhereClause;
use crate::config::DaoConfig;
use crate::connection::ConnectionSource;
use crate::error::{DaoError, Result};
use crate::mapper::{map_rows, rows_to_records};
use crate::traits::{
    ConnectionFactory, DataModifyEvent, DataModifyListener, DatabaseDriver, ModifyKind, Record,
};
use crate::types::{QueryResult, Row, SqlValue, UpdateResult};

/// Message carried by mutations rejected for lack of values.
pub(crate) const EMPTY_VALUES: &str = "params is empty";

/// Custom row-to-record conversion, used instead of [`Record::from_row`].
pub type RowMapper<T> = Arc<dyn Fn(&Row) -> Result<T> + Send + Sync>;

/// Schema, table and projection of an accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIdentity {
    /// Empty means the table is referenced unqualified.
    pub schema: String,
    pub table: String,
    pub select_fields: String,
}

impl TableIdentity {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: String::new(),
            table: table.into(),
            select_fields: "*".to_string(),
        }
    }

    /// `` `schema`.`table` `` or `` `table` ``.
    pub fn qualified_name(&self) -> String {
        if self.schema.is_empty() {
            quote_ident(&self.table)
        } else {
            format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
        }
    }
}

/// Generic data accessor for record type `T` stored in one table.
///
/// # Example
/// ```ignore
/// let users: Dao<User> = client.dao("users");
/// let ann = users.find_by_id(1).await?;
/// let archived = users.use_table("users_archive");
/// let page = archived.find_page(0, 20, WhereClause::none(), "`id` DESC").await?;
/// ```
pub struct Dao<T> {
    identity: TableIdentity,
    source: ConnectionSource,
    config: DaoConfig,
    listener: Option<Arc<dyn DataModifyListener>>,
    row_mapper: Option<RowMapper<T>>,
}

impl<T> Clone for Dao<T> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            source: self.source.clone(),
            config: self.config.clone(),
            listener: self.listener.clone(),
            row_mapper: self.row_mapper.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Dao<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dao")
            .field("identity", &self.identity)
            .field("source", &self.source)
            .field("config", &self.config)
            .field("listener", &self.listener.is_some())
            .field("row_mapper", &self.row_mapper.is_some())
            .finish()
    }
}

impl<T: Record> Dao<T> {
    pub fn new(table: impl Into<String>, source: ConnectionSource, config: DaoConfig) -> Self {
        let mut identity = TableIdentity::new(table);
        identity.select_fields = config.select_fields.clone();
        Self {
            identity,
            source,
            config,
            listener: None,
            row_mapper: None,
        }
    }

    /// Accessor over a single shared connection with default settings.
    pub fn with_driver(table: impl Into<String>, driver: Arc<dyn DatabaseDriver>) -> Self {
        Self::new(
            table,
            ConnectionSource::Connection(driver),
            DaoConfig::default(),
        )
    }

    /// Accessor that acquires a connection per call with default settings.
    pub fn with_factory(table: impl Into<String>, factory: Arc<dyn ConnectionFactory>) -> Self {
        Self::new(table, ConnectionSource::Factory(factory), DaoConfig::default())
    }

    pub fn identity(&self) -> &TableIdentity {
        &self.identity
    }

    pub fn config(&self) -> &DaoConfig {
        &self.config
    }

    pub fn qualified_table(&self) -> String {
        self.identity.qualified_name()
    }

    /// Same accessor against another table.
    pub fn use_table(&self, table: impl Into<String>) -> Self {
        let mut dao = self.clone();
        dao.identity.table = table.into();
        dao
    }

    /// Same accessor against another schema. Empty unqualifies the table.
    pub fn use_schema(&self, schema: impl Into<String>) -> Self {
        let mut dao = self.clone();
        dao.identity.schema = schema.into();
        dao
    }

    /// Same accessor over a single shared connection.
    pub fn use_connection(&self, driver: Arc<dyn DatabaseDriver>) -> Self {
        let mut dao = self.clone();
        dao.source = ConnectionSource::Connection(driver);
        dao
    }

    /// Same accessor acquiring a connection per call from `factory`.
    pub fn use_factory(&self, factory: Arc<dyn ConnectionFactory>) -> Self {
        let mut dao = self.clone();
        dao.source = ConnectionSource::Factory(factory);
        dao
    }

    /// Same accessor with another projection, e.g. `` `id`,`name` ``.
    pub fn with_select_fields(&self, fields: impl Into<String>) -> Self {
        let mut dao = self.clone();
        dao.identity.select_fields = fields.into();
        dao
    }

    pub fn with_listener(&self, listener: Arc<dyn DataModifyListener>) -> Self {
        let mut dao = self.clone();
        dao.listener = Some(listener);
        dao
    }

    /// Same accessor mapping rows through `mapper` instead of
    /// `T::from_row`. Later retargets keep the mapper.
    pub fn with_row_mapper<F>(&self, mapper: F) -> Self
    where
        F: Fn(&Row) -> Result<T> + Send + Sync + 'static,
    {
        let mut dao = self.clone();
        dao.row_mapper = Some(Arc::new(mapper));
        dao
    }

    pub fn with_config(&self, config: DaoConfig) -> Self {
        let mut dao = self.clone();
        dao.config = config;
        dao
    }

    async fn fetch(&self, stmt: Statement) -> Result<Vec<T>> {
        let conn = self.source.acquire().await?;
        debug!(sql = %stmt.sql, params = stmt.params.len(), "query");
        let raw = conn.query(&stmt.sql, &stmt.params).await?;
        match &self.row_mapper {
            Some(mapper) => map_rows(raw, mapper.as_ref()),
            None => rows_to_records(raw),
        }
    }

    async fn fetch_count(&self, stmt: Statement) -> Result<i64> {
        let conn = self.source.acquire().await?;
        debug!(sql = %stmt.sql, params = stmt.params.len(), "count");
        let raw = conn.query(&stmt.sql, &stmt.params).await?;
        let (column, value) = QueryResult::from_raw(raw).scalar()?;
        value.to_count(&column)
    }

    async fn modify(&self, kind: ModifyKind, stmt: Statement) -> Result<UpdateResult> {
        let conn = self.source.acquire().await?;
        debug!(sql = %stmt.sql, params = stmt.params.len(), "execute");
        let affected = conn.execute(&stmt.sql, &stmt.params).await?;
        if let Some(listener) = &self.listener {
            listener.on_data_modified(&DataModifyEvent {
                table: self.qualified_table(),
                kind,
                affected_rows: affected,
            });
        }
        Ok(UpdateResult::affected(affected))
    }

    fn reject(&self, reason: &str) -> UpdateResult {
        warn!(table = %self.identity.table, reason, "mutation rejected");
        UpdateResult::failed(reason)
    }
}

/// `` `field` = ? `` for the by-field helpers. The name is trimmed and must
/// not end up empty.
pub(crate) fn field_clause(field: &str, value: impl Into<SqlValue>) -> Result<WhereClause> {
    let field = field.trim();
    if field.is_empty() {
        return Err(DaoError::InvalidArgument(
            "field name can not be empty".to_string(),
        ));
    }
    Ok(WhereClause::eq(field, value))
}
