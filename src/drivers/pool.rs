//! Connection factory over a `deadpool-postgres` pool.

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

use super::tokio_postgres::{execute_client, query_client};
use crate::error::{DaoError, Result};
use crate::traits::{ConnectionFactory, DatabaseDriver};
use crate::types::{RawQueryResult, SqlValue};

/// Create a pool from a database URL.
///
/// Uses `NoTls`; build the [`Pool`] yourself and hand it to
/// [`PooledConnectionFactory::new`] when TLS or finer tuning is needed.
pub fn create_pool(database_url: &str, max_size: usize) -> Result<Pool> {
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| DaoError::ConnectionFailed(e.to_string()))?;

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| DaoError::ConnectionFailed(e.to_string()))
}

/// Hands out one pooled connection per accessor call. The connection goes
/// back to the pool when the call drops it.
#[derive(Clone)]
pub struct PooledConnectionFactory {
    pool: Pool,
}

impl PooledConnectionFactory {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

#[async_trait]
impl ConnectionFactory for PooledConnectionFactory {
    async fn acquire(&self) -> Result<Box<dyn DatabaseDriver>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DaoError::ConnectionFailed(e.to_string()))?;
        Ok(Box::new(PooledConnection { client }))
    }
}

struct PooledConnection {
    client: Object,
}

#[async_trait]
impl DatabaseDriver for PooledConnection {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        query_client(&self.client, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        execute_client(&self.client, sql, params).await
    }
}
