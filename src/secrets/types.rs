//! Secure types for handling sensitive data.
//!
//! `SecretBytes` prevents accidental exposure of secret values through
//! logging, debugging, or serialization; the domain types around it carry the
//! audit metadata every backend must maintain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An opaque byte string wrapper that redacts its contents in Debug, Display,
/// and serialization.
///
/// - Debug output shows `SecretBytes([REDACTED])` instead of the value
/// - Serialization outputs `"[REDACTED]"` (NEVER the actual value)
/// - Deserialization accepts actual values (e.g. from config files)
/// - Memory is zeroed when dropped (via `zeroize`)
///
/// The value can only be reached via [`SecretBytes::expose_secret`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes(Vec<u8>);

impl Serialize for SecretBytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretBytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SecretBytes(value.into_bytes()))
    }
}

impl SecretBytes {
    /// Creates a new SecretBytes from a byte or string value.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    /// Exposes the underlying secret value.
    ///
    /// Only use at the point where the raw bytes are needed (encryption,
    /// wire encoding). Never log or print the result.
    pub fn expose_secret(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the secret without exposing the value.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes([REDACTED])")
    }
}

impl fmt::Display for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<&str> for SecretBytes {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

/// Payload for a secret write: the confidential value plus the acting user.
#[derive(Debug, Clone)]
pub struct SecretWrite {
    pub value: SecretBytes,
    pub user_id: i64,
}

impl SecretWrite {
    pub fn new(value: impl Into<SecretBytes>, user_id: i64) -> Self {
        Self { value: value.into(), user_id }
    }
}

impl From<Vec<u8>> for SecretBytes {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

/// A secret as returned by a backend read: current value plus audit metadata.
///
/// `value` is `None` when the caller did not opt in to receiving the secret;
/// the facade strips it by default.
#[derive(Debug, Clone, Serialize)]
pub struct SecretRecord {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<SecretBytes>,
    pub creator_id: i64,
    pub updater_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
