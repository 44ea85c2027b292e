//! Vault secret backend: HashiCorp Vault KV v2 under a fixed mount.
//!
//! Logical keys contain `/`, which Vault would interpret as path hierarchy,
//! so every path operation runs the key through [`crate::secrets::key_codec`]
//! first and enumeration decodes on the way out. The record is stored as a
//! `secret_data` mapping on the node; Vault's own response envelope is
//! unwrapped by the client.

use super::backend::SecretBackend;
use crate::errors::{Error, Result};
use crate::secrets::key_codec;
use crate::secrets::types::{SecretBytes, SecretRecord, SecretWrite};
use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::error::ClientError;
use vaultrs::kv2;

/// Configuration for the Vault backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultBackendConfig {
    /// Vault server address
    pub address: String,
    /// Vault authentication token
    pub token: Option<String>,
    /// Vault namespace (for Enterprise)
    pub namespace: Option<String>,
    /// KV v2 mount path (default: "secret")
    #[serde(default = "default_kv_mount")]
    pub kv_mount_path: String,
}

fn default_kv_mount() -> String {
    "secret".to_string()
}

impl VaultBackendConfig {
    /// Load configuration from environment variables
    ///
    /// Uses:
    /// - `STRONGROOM_VAULT_ADDR` or `VAULT_ADDR`
    /// - `STRONGROOM_VAULT_TOKEN` or `VAULT_TOKEN`
    /// - `STRONGROOM_VAULT_NAMESPACE` or `VAULT_NAMESPACE`
    /// - `STRONGROOM_VAULT_KV_MOUNT` (default: "secret")
    ///
    /// Returns `Ok(None)` when no address is configured, so callers can tell
    /// "vault not set up" apart from "vault set up badly".
    pub fn from_env() -> Result<Option<Self>> {
        let address =
            std::env::var("STRONGROOM_VAULT_ADDR").or_else(|_| std::env::var("VAULT_ADDR")).ok();

        let Some(address) = address else {
            return Ok(None);
        };

        let token =
            std::env::var("STRONGROOM_VAULT_TOKEN").or_else(|_| std::env::var("VAULT_TOKEN")).ok();

        let namespace = std::env::var("STRONGROOM_VAULT_NAMESPACE")
            .or_else(|_| std::env::var("VAULT_NAMESPACE"))
            .ok();

        let kv_mount_path =
            std::env::var("STRONGROOM_VAULT_KV_MOUNT").unwrap_or_else(|_| default_kv_mount());

        Ok(Some(Self { address, token, namespace, kv_mount_path }))
    }
}

/// Wire format of a secret node: the record nested under `secret_data`.
#[derive(Debug, Serialize, Deserialize)]
struct VaultNode {
    secret_data: VaultSecretData,
}

/// The flat mapping stored on each node. The value is base64 so that binary
/// secrets survive the JSON envelope.
#[derive(Debug, Serialize, Deserialize)]
struct VaultSecretData {
    value: String,
    creator_id: i64,
    updater_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// HashiCorp Vault secret backend
pub struct VaultSecretBackend {
    client: VaultClient,
    kv_mount_path: String,
}

impl std::fmt::Debug for VaultSecretBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSecretBackend")
            .field("kv_mount_path", &self.kv_mount_path)
            .field("client", &"[VaultClient]")
            .finish()
    }
}

impl VaultSecretBackend {
    /// Create a new Vault backend with the given configuration
    pub fn new(config: VaultBackendConfig) -> Result<Self> {
        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&config.address);

        if let Some(ref token) = config.token {
            settings_builder.token(token);
        }

        if let Some(ref namespace) = config.namespace {
            settings_builder.namespace(Some(namespace.clone()));
        }

        let settings = settings_builder
            .build()
            .map_err(|e| Error::config(format!("Invalid Vault backend configuration: {}", e)))?;

        let client = VaultClient::new(settings)
            .map_err(|e| Error::config(format!("Failed to create Vault client: {}", e)))?;

        info!(address = %config.address, kv_mount = %config.kv_mount_path, "Initialized Vault secret backend");

        Ok(Self { client, kv_mount_path: config.kv_mount_path })
    }

    /// Create backend from environment configuration
    pub fn from_env() -> Result<Option<Self>> {
        match VaultBackendConfig::from_env()? {
            Some(config) => Ok(Some(Self::new(config)?)),
            None => Ok(None),
        }
    }

    fn record_from_node(key: &str, node: VaultNode) -> Result<SecretRecord> {
        let value = base64::engine::general_purpose::STANDARD
            .decode(&node.secret_data.value)
            .map_err(|e| Error::vault(format!("Corrupt value encoding for '{}': {}", key, e)))?;

        Ok(SecretRecord {
            key: key.to_string(),
            value: Some(SecretBytes::new(value)),
            creator_id: node.secret_data.creator_id,
            updater_id: node.secret_data.updater_id,
            created_at: node.secret_data.created_at,
            updated_at: node.secret_data.updated_at,
        })
    }

    async fn read_node(&self, key: &str) -> Result<Option<VaultNode>> {
        let path = key_codec::encode(key);
        match kv2::read::<VaultNode>(&self.client, &self.kv_mount_path, &path).await {
            Ok(node) => Ok(Some(node)),
            Err(ClientError::APIError { code: 404, .. }) => Ok(None),
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Failed to read secret from Vault");
                Err(Error::vault(format!("Failed to read secret '{}': {}", key, e)))
            }
        }
    }
}

#[async_trait]
impl SecretBackend for VaultSecretBackend {
    #[instrument(skip(self), fields(key = %key, kv_mount = %self.kv_mount_path), name = "vault_read_secret")]
    async fn read(&self, key: &str) -> Result<SecretRecord> {
        match self.read_node(key).await? {
            Some(node) => Self::record_from_node(key, node),
            None => Err(Error::not_found(key)),
        }
    }

    #[instrument(skip(self, payload), fields(key = %key, user_id = payload.user_id), name = "vault_write_secret")]
    async fn write(&self, key: &str, payload: &SecretWrite) -> Result<bool> {
        let now = Utc::now();

        // Creator and creation time survive overwrites.
        let (creator_id, created_at) = match self.read_node(key).await? {
            Some(existing) => {
                (existing.secret_data.creator_id, existing.secret_data.created_at)
            }
            None => (payload.user_id, now),
        };

        let node = VaultNode {
            secret_data: VaultSecretData {
                value: base64::engine::general_purpose::STANDARD
                    .encode(payload.value.expose_secret()),
                creator_id,
                updater_id: payload.user_id,
                created_at,
                updated_at: now,
            },
        };

        let path = key_codec::encode(key);
        kv2::set(&self.client, &self.kv_mount_path, &path, &node).await.map_err(|e| {
            tracing::error!(error = %e, key = %key, "Failed to write secret to Vault");
            Error::vault(format!("Failed to write secret '{}': {}", key, e))
        })?;

        debug!(key = %key, "Stored secret in Vault");
        Ok(true)
    }

    #[instrument(skip(self), fields(key = %key), name = "vault_delete_secret")]
    async fn delete(&self, key: &str) -> Result<()> {
        // The path separator embedded in the logical key is encoded exactly
        // as on the read and write paths; an absent node is not an error.
        let path = key_codec::encode(key);
        match kv2::delete_metadata(&self.client, &self.kv_mount_path, &path).await {
            Ok(()) => Ok(()),
            Err(ClientError::APIError { code: 404, .. }) => Ok(()),
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Failed to delete secret from Vault");
                Err(Error::vault(format!("Failed to delete secret '{}': {}", key, e)))
            }
        }
    }

    #[instrument(skip(self), fields(kv_mount = %self.kv_mount_path), name = "vault_list_secret_keys")]
    async fn keys(&self) -> Result<Vec<String>> {
        match kv2::list(&self.client, &self.kv_mount_path, "").await {
            Ok(keys) => Ok(keys.iter().map(|k| key_codec::decode(k)).collect()),
            // An empty mount lists as 404.
            Err(ClientError::APIError { code: 404, .. }) => Ok(Vec::new()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to list secrets from Vault");
                Err(Error::vault(format!("Failed to list secrets: {}", e)))
            }
        }
    }
}
