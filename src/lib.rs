//! # Strongroom
//!
//! Strongroom is the secret-storage core of a deployment system: a uniform
//! key/value interface for confidential values, fronting two interchangeable
//! backends (encrypted rows in the relational database, or an external
//! HashiCorp Vault service) with strict key validation, encryption at rest,
//! and access scoping by project/environment.
//!
//! ## Architecture
//!
//! ```text
//! Consumers → SecretStorage (facade) → SecretBackend (trait)
//!                                       ├── DatabaseSecretBackend (sqlx + AES-256-GCM)
//!                                       └── VaultSecretBackend (vaultrs, KV v2)
//! ```
//!
//! The active backend is named in configuration and resolved exactly once at
//! process initialization; consumers never address a backend directly. See
//! [`secrets`] for the full module tour.

pub mod config;
pub mod errors;
pub mod secrets;
pub mod services;
pub mod storage;

// Re-export commonly used types and traits
pub use config::{DatabaseConfig, SecretsConfig};
pub use errors::{Error, Result};
pub use secrets::{
    BackendKind, Principal, SecretBackend, SecretBytes, SecretRecord, SecretStorage, SecretWrite,
};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
