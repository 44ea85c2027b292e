//! The secret storage facade.
//!
//! Single entry point for every consumer: validates keys, refuses empty
//! values, strips secret values from reads unless explicitly requested, and
//! delegates to the one backend chosen at startup. No consumer addresses a
//! backend directly.

use crate::errors::Result;
use crate::secrets::backends::SecretBackend;
use crate::secrets::scope::{AccessScope, Principal};
use crate::secrets::types::{SecretRecord, SecretWrite};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

/// Allowed secret key alphabet: word characters, `/`, and `-`, nothing else.
static SECRET_KEY_FORMAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A[\w/-]+\z").unwrap());

/// Facade over the process-wide secret backend.
#[derive(Debug, Clone)]
pub struct SecretStorage {
    backend: Arc<dyn SecretBackend>,
}

impl SecretStorage {
    /// Wrap the backend resolved at startup. The backend is fixed for the
    /// process lifetime.
    pub fn new(backend: Arc<dyn SecretBackend>) -> Self {
        Self { backend }
    }

    /// Store a secret.
    ///
    /// Returns `Ok(false)` without touching the backend when the key is
    /// malformed or the value is empty; backend-level rejections also come
    /// back as `Ok(false)`. Infrastructure failures propagate as errors.
    pub async fn write(&self, key: &str, payload: &SecretWrite) -> Result<bool> {
        if !SECRET_KEY_FORMAT.is_match(key) {
            warn!(key = %key, "Rejected secret write: malformed key");
            return Ok(false);
        }

        if payload.value.is_empty() {
            warn!(key = %key, "Rejected secret write: empty value");
            return Ok(false);
        }

        self.backend.write(key, payload).await
    }

    /// Read a secret.
    ///
    /// Fails with [`crate::errors::Error::NotFound`] if the key is absent.
    /// Unless `include_secret` is set, the value is stripped before the
    /// record is returned; this confidentiality boundary holds regardless of
    /// which backend is active.
    pub async fn read(&self, key: &str, include_secret: bool) -> Result<SecretRecord> {
        let mut record = self.backend.read(key).await?;
        if !include_secret {
            record.value = None;
        }
        Ok(record)
    }

    /// Delete a secret. A no-op when the key is absent.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.backend.delete(key).await
    }

    /// Enumerate all stored keys.
    pub async fn keys(&self) -> Result<Vec<String>> {
        self.backend.keys().await
    }

    /// The key prefixes this principal may operate on: their
    /// administered-project permalinks, with `global` first for admins.
    ///
    /// This is a capability computation only; callers are responsible for
    /// checking keys against it when listing or writing.
    pub fn allowed_project_prefixes(&self, principal: &Principal) -> Vec<String> {
        AccessScope::for_principal(principal).into_prefixes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        assert!(SECRET_KEY_FORMAT.is_match("production/app/db-password"));
        assert!(SECRET_KEY_FORMAT.is_match("global/API_TOKEN"));
        assert!(SECRET_KEY_FORMAT.is_match("a-b/c_d/0"));

        assert!(!SECRET_KEY_FORMAT.is_match("a b/c"));
        assert!(!SECRET_KEY_FORMAT.is_match("a.b/c"));
        assert!(!SECRET_KEY_FORMAT.is_match("key\n/x"));
        assert!(!SECRET_KEY_FORMAT.is_match(""));
    }
}
