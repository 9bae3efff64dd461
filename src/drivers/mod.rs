#[cfg(feature = "pool")]
mod pool;
mod tokio_postgres;

pub use self::in_memory_test::{
    InMemoryResponse, InMemoryTestDriver, InMemoryTestResponseBuilder, RecordedQuery,
    StatementKind,
};
#[cfg(feature = "pool")]
pub use self::pool::{create_pool, PooledConnectionFactory};
pub use self::tokio_postgres::{to_postgres_sql, TokioPostgresDriver};
