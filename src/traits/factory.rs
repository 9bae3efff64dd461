use async_trait::async_trait;

use crate::error::Result;
use crate::traits::DatabaseDriver;

/// Source of connections that are used for exactly one accessor call.
///
/// The returned handle is dropped when the call finishes, on success and on
/// error alike; pooled implementations return the connection to the pool
/// from `Drop`.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn DatabaseDriver>>;
}
