//! Configuration for the secret storage core.
//!
//! Everything is read from the environment once at startup and passed
//! explicitly to constructors; no hidden mutable globals.

use crate::errors::{Error, Result};
use crate::secrets::backends::{BackendKind, VaultBackendConfig};
use crate::services::SecretEncryptionConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL (`sqlite://...` or `sqlite::memory:`)
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout_seconds: u64,

    /// Run the schema bootstrap on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://strongroom.db".to_string(),
            max_connections: 5,
            connect_timeout_seconds: 10,
            auto_migrate: true,
        }
    }
}

/// Parse an optional environment variable. An absent variable yields the
/// default; a present but unparseable value is a configuration error, not a
/// silent fallback.
fn parse_env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| Error::config(format!("Invalid value for {}: '{}'", name, value))),
        Err(_) => Ok(default),
    }
}

impl DatabaseConfig {
    /// Load from `STRONGROOM_DATABASE_URL` and friends, with defaults.
    ///
    /// Fails with [`Error::Config`] when a variable is set to a value that
    /// does not parse.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            url: std::env::var("STRONGROOM_DATABASE_URL").unwrap_or(defaults.url),
            max_connections: parse_env_or(
                "STRONGROOM_DATABASE_MAX_CONNECTIONS",
                defaults.max_connections,
            )?,
            connect_timeout_seconds: parse_env_or(
                "STRONGROOM_DATABASE_CONNECT_TIMEOUT",
                defaults.connect_timeout_seconds,
            )?,
            auto_migrate: parse_env_or(
                "STRONGROOM_DATABASE_AUTO_MIGRATE",
                defaults.auto_migrate,
            )?,
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Validate the configuration before a pool is created from it.
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::validation("database URL cannot be empty"));
        }

        if !self.url.starts_with("sqlite:") {
            return Err(Error::validation("Database URL must start with 'sqlite:'"));
        }

        if self.max_connections == 0 {
            return Err(Error::validation("max_connections must be greater than 0"));
        }

        Ok(())
    }
}

/// Top-level configuration: the active backend and whatever that backend
/// needs. Read once at startup; the backend choice is immutable afterward.
#[derive(Debug, Clone)]
pub struct SecretsConfig {
    /// Which backend implementation serves this process
    pub backend: BackendKind,

    /// Database settings (used by `db_backend`)
    pub database: DatabaseConfig,

    /// Vault settings (required for `hashicorp_vault`)
    pub vault: Option<VaultBackendConfig>,

    /// Encryption-at-rest settings (required for `db_backend`)
    pub encryption: Option<SecretEncryptionConfig>,
}

impl SecretsConfig {
    /// Load the full configuration from the environment.
    ///
    /// `STRONGROOM_SECRET_BACKEND` selects the backend (`db_backend` by
    /// default). Settings the selected backend requires are validated here
    /// so that misconfiguration fails at startup, not on first use.
    pub fn from_env() -> Result<Self> {
        let backend = match std::env::var("STRONGROOM_SECRET_BACKEND") {
            Ok(value) => value.parse::<BackendKind>().map_err(Error::config)?,
            Err(_) => BackendKind::DbBackend,
        };

        let database = DatabaseConfig::from_env()?;
        let vault = VaultBackendConfig::from_env()?;
        let encryption = SecretEncryptionConfig::from_env().ok();

        let config = Self { backend, database, vault, encryption };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        match self.backend {
            BackendKind::DbBackend => {
                self.database.validate()?;
                if self.encryption.is_none() {
                    return Err(Error::config(
                        "db_backend requires STRONGROOM_SECRET_ENCRYPTION_KEY",
                    ));
                }
            }
            BackendKind::HashicorpVault => {
                if self.vault.is_none() {
                    return Err(Error::config("hashicorp_vault requires VAULT_ADDR"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.url, "sqlite://strongroom.db");
        assert_eq!(config.max_connections, 5);
        assert!(config.auto_migrate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_config_rejects_non_sqlite_url() {
        let config = DatabaseConfig {
            url: "postgresql://localhost/strongroom".to_string(),
            ..DatabaseConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env_rejects_unparseable_values() {
        // Absent vars fall back to defaults
        std::env::remove_var("STRONGROOM_DATABASE_MAX_CONNECTIONS");
        let config = DatabaseConfig::from_env().unwrap();
        assert_eq!(config.max_connections, DatabaseConfig::default().max_connections);

        // A set-but-invalid value must fail loudly, not fall back
        std::env::set_var("STRONGROOM_DATABASE_MAX_CONNECTIONS", "lots");
        let result = DatabaseConfig::from_env();
        std::env::remove_var("STRONGROOM_DATABASE_MAX_CONNECTIONS");

        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_database_config_rejects_zero_connections() {
        let config = DatabaseConfig { max_connections: 0, ..DatabaseConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secrets_config_requires_encryption_for_db_backend() {
        let config = SecretsConfig {
            backend: BackendKind::DbBackend,
            database: DatabaseConfig::default(),
            vault: None,
            encryption: None,
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_secrets_config_requires_vault_address_for_vault_backend() {
        let config = SecretsConfig {
            backend: BackendKind::HashicorpVault,
            database: DatabaseConfig::default(),
            vault: None,
            encryption: None,
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }
}
