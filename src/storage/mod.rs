//! # Storage and Persistence
//!
//! Database connectivity for the encrypted secret store.

pub mod migrations;
pub mod pool;

pub use crate::config::DatabaseConfig;
pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool};

use crate::errors::{Error, Result};

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| Error::Database {
        source: e,
        context: "Database connectivity check failed".to_string(),
    })?;

    Ok(())
}
