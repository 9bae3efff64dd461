use std::ops::Deref;
use std::sync::Arc;

use crate::error::Result;
use crate::traits::{ConnectionFactory, DatabaseDriver};

/// Where an accessor gets its connection from.
#[derive(Clone)]
pub enum ConnectionSource {
    /// One shared connection. Concurrent callers are not serialized here;
    /// the driver must cope with that itself.
    Connection(Arc<dyn DatabaseDriver>),
    /// A fresh connection per accessor call.
    Factory(Arc<dyn ConnectionFactory>),
}

impl ConnectionSource {
    /// Obtains the connection for one call. A factory-made connection is
    /// released when the returned lease is dropped.
    pub async fn acquire(&self) -> Result<Lease> {
        match self {
            ConnectionSource::Connection(driver) => Ok(Lease::Shared(Arc::clone(driver))),
            ConnectionSource::Factory(factory) => factory.acquire().await.map(Lease::Owned),
        }
    }
}

impl std::fmt::Debug for ConnectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionSource::Connection(_) => f.write_str("ConnectionSource::Connection"),
            ConnectionSource::Factory(_) => f.write_str("ConnectionSource::Factory"),
        }
    }
}

/// A connection borrowed for the duration of one call.
pub enum Lease {
    Shared(Arc<dyn DatabaseDriver>),
    Owned(Box<dyn DatabaseDriver>),
}

impl Deref for Lease {
    type Target = dyn DatabaseDriver;

    fn deref(&self) -> &Self::Target {
        match self {
            Lease::Shared(driver) => driver.as_ref(),
            Lease::Owned(driver) => driver.as_ref(),
        }
    }
}
