//! Secret backend trait and backend selection type.

use crate::errors::Result;
use crate::secrets::types::{SecretRecord, SecretWrite};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which backend implementation is active for this process.
///
/// Resolved once at startup from configuration; there is no runtime
/// re-resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Encrypted rows in the relational database
    DbBackend,
    /// External HashiCorp Vault KV engine
    HashicorpVault,
}

impl BackendKind {
    /// Get the configuration representation of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DbBackend => "db_backend",
            Self::HashicorpVault => "hashicorp_vault",
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "db_backend" => Ok(Self::DbBackend),
            "hashicorp_vault" => Ok(Self::HashicorpVault),
            _ => Err(format!("Unknown secret backend: {}", s)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Uniform capability set every secret backend implements.
///
/// Implementations must be Send + Sync for use behind a shared handle.
#[async_trait]
pub trait SecretBackend: Send + Sync + std::fmt::Debug {
    /// Read the secret stored under `key`.
    ///
    /// Fails with [`crate::errors::Error::NotFound`] if the key does not
    /// exist. The returned record carries the current value and audit
    /// metadata; value stripping happens at the facade, not here.
    async fn read(&self, key: &str) -> Result<SecretRecord>;

    /// Create or update the secret under `key`.
    ///
    /// On create, `creator_id` is fixed to the writing user; on update it is
    /// preserved and only `updater_id` is reassigned. Returns `Ok(false)` if
    /// backend-level validation declines the write; infrastructure failures
    /// propagate as errors.
    async fn write(&self, key: &str, payload: &SecretWrite) -> Result<bool>;

    /// Delete the secret under `key`. A no-op if the key is absent.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Enumerate all stored keys.
    ///
    /// The database backend returns ids in ascending lexicographic order;
    /// the vault backend returns the engine's native order with each key
    /// decoded through the same codec used on reads.
    async fn keys(&self) -> Result<Vec<String>>;
}
