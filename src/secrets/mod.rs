//! Secret storage core.
//!
//! A uniform key/value secret interface over two interchangeable backends:
//! encrypted rows in the relational database, or an external HashiCorp Vault
//! KV engine. Keys are namespaced as `project/environment/name` (with the
//! sentinel `global` project for shared secrets); values are confidential
//! byte strings with creator/updater audit metadata.
//!
//! # Architecture
//!
//! - [`SecretStorage`] is the facade every consumer goes through: key
//!   validation, empty-value rejection, value stripping on read, and
//!   access-prefix computation.
//! - [`SecretBackend`] is the capability set both backends implement,
//!   resolved once at startup from [`BackendKind`] via
//!   [`backends::build_backend`].
//! - [`backends::DatabaseSecretBackend`] provides encryption at rest with a
//!   process-wide key and per-row fingerprint for rotation detection.
//! - [`backends::VaultSecretBackend`] stores KV v2 nodes under a fixed mount,
//!   with `/` in logical keys escaped through [`key_codec`].
//! - [`scope`] covers per-request access scoping and the vault-server /
//!   deploy-group association rule.
//!
//! # Example
//!
//! ```rust,ignore
//! use strongroom::config::SecretsConfig;
//! use strongroom::secrets::{backends, SecretStorage, SecretWrite};
//!
//! let config = SecretsConfig::from_env()?;
//! let storage = SecretStorage::new(backends::build_backend(&config).await?);
//!
//! storage.write("checkout/production/db-password", &SecretWrite::new("s3cret", user_id)).await?;
//! let record = storage.read("checkout/production/db-password", false).await?;
//! assert!(record.value.is_none()); // stripped unless explicitly requested
//! ```

pub mod backends;
pub mod key_codec;
pub mod scope;
pub mod storage;
pub mod types;

pub use backends::{BackendKind, SecretBackend};
pub use scope::{validate_same_scope, AccessScope, DeployGroup, Principal, GLOBAL_SCOPE};
pub use storage::SecretStorage;
pub use types::{SecretBytes, SecretRecord, SecretWrite};
