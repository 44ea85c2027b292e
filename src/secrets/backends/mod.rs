//! Pluggable secret backends.
//!
//! The active backend is chosen once at startup by [`build_backend`] and
//! never re-resolved; all consumers share the returned handle through the
//! [`crate::secrets::SecretStorage`] facade.

pub mod backend;
pub mod database;
pub mod vault;

pub use backend::{BackendKind, SecretBackend};
pub use database::DatabaseSecretBackend;
pub use vault::{VaultBackendConfig, VaultSecretBackend};

use crate::config::SecretsConfig;
use crate::errors::{Error, Result};
use crate::services::SecretEncryption;
use crate::storage;
use std::sync::Arc;
use tracing::info;

/// Resolve the configured [`BackendKind`] into a concrete backend handle.
///
/// For the database backend this creates the connection pool (running the
/// schema bootstrap if configured) and the encryption service; for Vault it
/// builds the API client. Called once during process initialization.
pub async fn build_backend(config: &SecretsConfig) -> Result<Arc<dyn SecretBackend>> {
    let backend: Arc<dyn SecretBackend> = match config.backend {
        BackendKind::DbBackend => {
            let pool = storage::create_pool(&config.database).await?;
            let encryption_config = config
                .encryption
                .clone()
                .ok_or_else(|| Error::config("db_backend requires an encryption key"))?;
            let encryption = Arc::new(SecretEncryption::new(&encryption_config)?);
            Arc::new(DatabaseSecretBackend::new(pool, encryption))
        }
        BackendKind::HashicorpVault => {
            let vault_config = config
                .vault
                .clone()
                .ok_or_else(|| Error::config("hashicorp_vault requires a Vault address"))?;
            Arc::new(VaultSecretBackend::new(vault_config)?)
        }
    };

    info!(backend = %config.backend, "Secret backend initialized");
    Ok(backend)
}
