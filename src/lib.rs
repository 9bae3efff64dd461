//! daors - A generic, per-table data accessor over pluggable SQL drivers
//!
//! # Example
//! ```ignore
//! use daors::{ColumnMap, DaoClient, WhereClause};
//!
//! // Connect to database
//! let client = DaoClient::connect("postgres://localhost/mydb").await?;
//! let users = client.dao::<User>("users");
//!
//! // Typed reads
//! let ann = users.find_by_id(1).await?;
//! let page = users
//!     .find_page(0, 20, WhereClause::raw("`age` > ?", [18])?, "`id` DESC")
//!     .await?;
//!
//! // Mutations report an UpdateResult
//! let result = users
//!     .update_by_id(&ColumnMap::new().with("name", "Ann"), 1)
//!     .await?;
//!
//! // Same accessor, other table
//! let archive = users.use_table("users_archive");
//! ```

pub mod builders;
pub mod clauses;
pub mod config;
pub mod connection;
pub mod dao;
pub mod drivers;
pub mod error;
pub mod mapper;
pub mod traits;
pub mod types;

mod client;

// Re-export main types for convenient access
pub use clauses::WhereClause;
pub use client::DaoClient;
pub use config::DaoConfig;
pub use connection::ConnectionSource;
pub use dao::{Dao, RowMapper, TableIdentity};
pub use error::{DaoError, Result};
pub use traits::{
    ConnectionFactory, DataModifyEvent, DataModifyListener, DatabaseDriver, ModifyKind, Record,
    ToColumnMap,
};
pub use types::{ColumnMap, FromSqlValue, Page, QueryResult, RawQueryResult, Row, SqlValue, UpdateResult};
