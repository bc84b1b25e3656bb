//! Context storage backends.
//!
//! - [`PostgresStore`]: production backend over PostgreSQL
//! - [`MemoryStore`]: in-process backend for tests

mod memory;
mod postgres;
mod traits;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use traits::*;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;

/// Create the configured storage backend.
pub async fn create_store(config: &Config) -> Result<Arc<dyn ContextStore>> {
    let store = PostgresStore::connect(&config.database).await?;
    Ok(Arc::new(store))
}
