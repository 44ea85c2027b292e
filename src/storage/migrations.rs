//! # Database Schema Bootstrap
//!
//! The schema is embedded in the binary and applied idempotently on startup
//! when auto_migrate is enabled.

use crate::errors::{Error, Result};
use crate::storage::DbPool;
use tracing::info;

/// The encrypted secret store. The full logical key is the primary key
/// (no surrogate id) and every row owns its encryption envelope:
/// ciphertext, nonce, and the hex SHA-256 fingerprint of the key that
/// produced it.
const CREATE_SECRETS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS secrets (
    id                 TEXT PRIMARY KEY NOT NULL,
    encrypted_value    BLOB NOT NULL,
    nonce              BLOB NOT NULL,
    encryption_key_sha TEXT NOT NULL,
    creator_id         INTEGER NOT NULL,
    updater_id         INTEGER NOT NULL,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
)";

/// Apply the embedded schema.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::query(CREATE_SECRETS_TABLE).execute(pool).await.map_err(|e| Error::Database {
        source: e,
        context: "Failed to create secrets table".to_string(),
    })?;

    info!("Database schema up to date");
    Ok(())
}
