//! Database secret backend: encrypted rows in the `secrets` table.
//!
//! One row per secret, keyed by the full logical key (no surrogate id). The
//! value is encrypted with the process-wide key before it touches the
//! database; alongside the ciphertext each row stores the cipher nonce and a
//! hex SHA-256 fingerprint of the encryption key, recomputed on every write
//! so a rotated key is detected on the next read instead of yielding garbage.

use super::backend::SecretBackend;
use crate::errors::{Error, Result};
use crate::secrets::types::{SecretBytes, SecretRecord, SecretWrite};
use crate::services::SecretEncryption;
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Row id format: a non-whitespace prefix, a slash, and an optional
/// non-whitespace suffix. `"a/"` is valid, `"nokey"` and `"/"` are not.
static ID_FORMAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A\S+/\S*\z").unwrap());

/// Database row for an encrypted secret
#[derive(Debug, Clone, FromRow)]
struct SecretRow {
    pub id: String,
    pub encrypted_value: Vec<u8>,
    pub nonce: Vec<u8>,
    pub encryption_key_sha: String,
    pub creator_id: i64,
    pub updater_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Secret backend storing encrypted rows in the relational database.
pub struct DatabaseSecretBackend {
    pool: DbPool,
    encryption: Arc<SecretEncryption>,
}

impl DatabaseSecretBackend {
    /// Create a new database backend
    pub fn new(pool: DbPool, encryption: Arc<SecretEncryption>) -> Self {
        Self { pool, encryption }
    }

    /// Row validation run before every save: id present and well-formed,
    /// encrypted payload present, key fingerprint present.
    fn valid_row(id: &str, encrypted_value: &[u8], encryption_key_sha: &str) -> bool {
        ID_FORMAT.is_match(id) && !encrypted_value.is_empty() && !encryption_key_sha.is_empty()
    }

    fn decrypt_row(&self, row: SecretRow) -> Result<SecretRecord> {
        // Fingerprint check first: a mismatch means the process key rotated
        // after this row was written, and decryption would fail anyway.
        let current_sha = self.encryption.key_fingerprint();
        if row.encryption_key_sha != current_sha {
            return Err(Error::decryption(format!(
                "encryption key fingerprint mismatch for '{}' (stored {}…, active {}…); \
                 was the key rotated?",
                row.id,
                &row.encryption_key_sha[..8.min(row.encryption_key_sha.len())],
                &current_sha[..8]
            )));
        }

        let plaintext = self.encryption.decrypt(&row.encrypted_value, &row.nonce)?;

        Ok(SecretRecord {
            key: row.id,
            value: Some(SecretBytes::new(plaintext)),
            creator_id: row.creator_id,
            updater_id: row.updater_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl SecretBackend for DatabaseSecretBackend {
    #[instrument(skip(self), fields(key = %key), name = "db_read_secret")]
    async fn read(&self, key: &str) -> Result<SecretRecord> {
        let row = sqlx::query_as::<_, SecretRow>(
            "SELECT id, encrypted_value, nonce, encryption_key_sha, creator_id, updater_id, \
             created_at, updated_at FROM secrets WHERE id = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, key = %key, "Failed to read secret");
            Error::Database { source: e, context: format!("Failed to read secret '{}'", key) }
        })?;

        match row {
            Some(row) => self.decrypt_row(row),
            None => Err(Error::not_found(key)),
        }
    }

    #[instrument(skip(self, payload), fields(key = %key, user_id = payload.user_id), name = "db_write_secret")]
    async fn write(&self, key: &str, payload: &SecretWrite) -> Result<bool> {
        let (encrypted, nonce) = self.encryption.encrypt(payload.value.expose_secret())?;
        let key_sha = self.encryption.key_fingerprint();

        if !Self::valid_row(key, &encrypted, &key_sha) {
            warn!(key = %key, "Rejected secret write: row validation failed");
            return Ok(false);
        }

        let now = Utc::now();

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM secrets WHERE id = $1")
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database {
                source: e,
                context: format!("Failed to look up secret '{}'", key),
            })?
            > 0;

        if existing {
            // Update: updater reassigned, creator untouched.
            sqlx::query(
                "UPDATE secrets SET encrypted_value = $1, nonce = $2, encryption_key_sha = $3, \
                 updater_id = $4, updated_at = $5 WHERE id = $6",
            )
            .bind(&encrypted)
            .bind(&nonce)
            .bind(&key_sha)
            .bind(payload.user_id)
            .bind(now)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %key, "Failed to update secret");
                Error::Database {
                    source: e,
                    context: format!("Failed to update secret '{}'", key),
                }
            })?;
        } else {
            // Insert: creator fixed here and never overwritten. Losing a
            // concurrent create race surfaces the primary-key violation as a
            // database error.
            sqlx::query(
                "INSERT INTO secrets (id, encrypted_value, nonce, encryption_key_sha, \
                 creator_id, updater_id, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(key)
            .bind(&encrypted)
            .bind(&nonce)
            .bind(&key_sha)
            .bind(payload.user_id)
            .bind(payload.user_id)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %key, "Failed to create secret");
                Error::Database {
                    source: e,
                    context: format!("Failed to create secret '{}'", key),
                }
            })?;

            tracing::info!(key = %key, user_id = payload.user_id, "Created new secret");
        }

        Ok(true)
    }

    #[instrument(skip(self), fields(key = %key), name = "db_delete_secret")]
    async fn delete(&self, key: &str) -> Result<()> {
        // Idempotent: zero rows affected is fine.
        sqlx::query("DELETE FROM secrets WHERE id = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %key, "Failed to delete secret");
                Error::Database {
                    source: e,
                    context: format!("Failed to delete secret '{}'", key),
                }
            })?;

        Ok(())
    }

    #[instrument(skip(self), name = "db_list_secret_keys")]
    async fn keys(&self) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT id FROM secrets ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to list secret keys");
                Error::Database { source: e, context: "Failed to list secret keys".to_string() }
            })
    }
}

impl std::fmt::Debug for DatabaseSecretBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSecretBackend")
            .field("pool", &"[DbPool]")
            .field("encryption", &self.encryption)
            .finish()
    }
}
