//! Secret encryption service using AES-256-GCM
//!
//! Encrypts secret values before they reach the database and decrypts them
//! transparently on read. The cipher and key are fixed at process start; key
//! material is never persisted. Each row stores only the per-row nonce and a
//! hex SHA-256 fingerprint of the key so that a rotated key is detected
//! before decryption instead of producing garbage.
//!
//! ## Configuration
//!
//! The encryption key is loaded from the environment variable:
//! `STRONGROOM_SECRET_ENCRYPTION_KEY` - Base64-encoded 32-byte key

use crate::errors::{Error, Result};
use base64::Engine;
use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, error};

/// Size of AES-256-GCM nonce in bytes
const NONCE_SIZE: usize = 12;

/// Size of AES-256-GCM tag in bytes
const TAG_SIZE: usize = 16;

/// Hex SHA-256 of arbitrary bytes. Shared by the encryption service and the
/// row validation path that re-checks fingerprints.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Configuration for the secret encryption service
#[derive(Debug, Clone)]
pub struct SecretEncryptionConfig {
    /// Base64-encoded 32-byte master encryption key
    pub master_key_base64: String,
}

impl SecretEncryptionConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let master_key_base64 =
            std::env::var("STRONGROOM_SECRET_ENCRYPTION_KEY").map_err(|_| {
                Error::config(
                    "STRONGROOM_SECRET_ENCRYPTION_KEY environment variable not set. \
                     Generate a key with: openssl rand -base64 32",
                )
            })?;

        Ok(Self { master_key_base64 })
    }

    /// Fixed-key configuration for tests. Never use outside tests.
    #[cfg(test)]
    pub fn for_testing() -> Self {
        let test_key = [0x42u8; 32];
        Self { master_key_base64: base64::engine::general_purpose::STANDARD.encode(test_key) }
    }
}

/// Single-use nonce sequence for AES-GCM
struct SingleNonce {
    nonce: Option<[u8; NONCE_SIZE]>,
}

impl SingleNonce {
    fn new(nonce_bytes: [u8; NONCE_SIZE]) -> Self {
        Self { nonce: Some(nonce_bytes) }
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> std::result::Result<Nonce, ring::error::Unspecified> {
        self.nonce.take().map(Nonce::assume_unique_for_key).ok_or(ring::error::Unspecified)
    }
}

/// Secret encryption service
#[derive(Clone)]
pub struct SecretEncryption {
    key_bytes: Arc<[u8; 32]>,
    rng: Arc<SystemRandom>,
}

impl SecretEncryption {
    /// Create a new encryption service from configuration
    pub fn new(config: &SecretEncryptionConfig) -> Result<Self> {
        let key_bytes = base64::engine::general_purpose::STANDARD
            .decode(&config.master_key_base64)
            .map_err(|e| {
                Error::config(format!("Invalid base64 in STRONGROOM_SECRET_ENCRYPTION_KEY: {}", e))
            })?;

        if key_bytes.len() != 32 {
            return Err(Error::config(format!(
                "STRONGROOM_SECRET_ENCRYPTION_KEY must be 32 bytes (256 bits), got {} bytes",
                key_bytes.len()
            )));
        }

        let mut key_array = [0u8; 32];
        key_array.copy_from_slice(&key_bytes);

        debug!("Secret encryption service initialized");

        Ok(Self { key_bytes: Arc::new(key_array), rng: Arc::new(SystemRandom::new()) })
    }

    /// Hex SHA-256 fingerprint of the active key.
    ///
    /// Recomputed on every call so that validation always checks against the
    /// key currently in memory, not a value cached before a rotation.
    pub fn key_fingerprint(&self) -> String {
        sha256_hex(&*self.key_bytes)
    }

    /// Encrypt plaintext data
    ///
    /// Returns a tuple of (ciphertext, nonce) where:
    /// - ciphertext includes the authentication tag appended
    /// - nonce is 12 bytes for AES-256-GCM
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        self.rng.fill(&mut nonce_bytes).map_err(|_| {
            error!("Failed to generate random nonce");
            Error::internal("Failed to generate random nonce for encryption")
        })?;

        let unbound_key = UnboundKey::new(&AES_256_GCM, &*self.key_bytes).map_err(|_| {
            error!("Failed to create encryption key");
            Error::internal("Failed to create encryption key")
        })?;

        let nonce_sequence = SingleNonce::new(nonce_bytes);
        let mut sealing_key = aead::SealingKey::new(unbound_key, nonce_sequence);

        let mut ciphertext = plaintext.to_vec();
        ciphertext.reserve(TAG_SIZE);

        sealing_key.seal_in_place_append_tag(Aad::empty(), &mut ciphertext).map_err(|_| {
            error!("Encryption failed");
            Error::internal("Failed to encrypt secret value")
        })?;

        Ok((ciphertext, nonce_bytes.to_vec()))
    }

    /// Decrypt ciphertext data
    ///
    /// The ciphertext must include the authentication tag appended and the
    /// nonce must be the 12-byte value stored with the row. Any mismatch
    /// (rotated key, tampered payload, wrong nonce) is a hard error.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
        if nonce.len() != NONCE_SIZE {
            return Err(Error::decryption(format!(
                "Invalid nonce length: expected {} bytes, got {} bytes",
                NONCE_SIZE,
                nonce.len()
            )));
        }

        if ciphertext.len() < TAG_SIZE {
            return Err(Error::decryption("Ciphertext too short (missing authentication tag)"));
        }

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        nonce_bytes.copy_from_slice(nonce);

        let unbound_key = UnboundKey::new(&AES_256_GCM, &*self.key_bytes).map_err(|_| {
            error!("Failed to create decryption key");
            Error::internal("Failed to create decryption key")
        })?;

        let nonce_sequence = SingleNonce::new(nonce_bytes);
        let mut opening_key = aead::OpeningKey::new(unbound_key, nonce_sequence);

        let mut plaintext = ciphertext.to_vec();

        let decrypted = opening_key.open_in_place(Aad::empty(), &mut plaintext).map_err(|_| {
            error!("Decryption failed - possible tampering or wrong key");
            Error::decryption("authentication failed (wrong or rotated key)")
        })?;

        Ok(decrypted.to_vec())
    }
}

impl std::fmt::Debug for SecretEncryption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretEncryption").field("key_bytes", &"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_encryption() -> SecretEncryption {
        let config = SecretEncryptionConfig::for_testing();
        SecretEncryption::new(&config).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let encryption = test_encryption();
        let plaintext = b"my-db-password";

        let (ciphertext, nonce) = encryption.encrypt(plaintext).unwrap();

        assert!(ciphertext.len() > plaintext.len());
        assert_eq!(nonce.len(), NONCE_SIZE);

        let decrypted = encryption.decrypt(&ciphertext, &nonce).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_binary_value_roundtrip() {
        let encryption = test_encryption();
        // Not valid UTF-8
        let plaintext: Vec<u8> = vec![0x00, 0xFF, 0xFE, 0x80, 0x81, 0x00, 0x0A];

        let (ciphertext, nonce) = encryption.encrypt(&plaintext).unwrap();
        let decrypted = encryption.decrypt(&ciphertext, &nonce).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_different_nonces_produce_different_ciphertext() {
        let encryption = test_encryption();
        let plaintext = b"same-plaintext";

        let (ciphertext1, nonce1) = encryption.encrypt(plaintext).unwrap();
        let (ciphertext2, nonce2) = encryption.encrypt(plaintext).unwrap();

        assert_ne!(nonce1, nonce2);
        assert_ne!(ciphertext1, ciphertext2);
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let encryption = test_encryption();
        let (mut ciphertext, nonce) = encryption.encrypt(b"sensitive-data").unwrap();

        ciphertext[0] ^= 0xFF;

        let result = encryption.decrypt(&ciphertext, &nonce);
        assert!(matches!(result, Err(Error::Decryption { .. })));
    }

    #[test]
    fn test_wrong_key_fails() {
        let encryption = test_encryption();
        let (ciphertext, nonce) = encryption.encrypt(b"sensitive-data").unwrap();

        let other = SecretEncryption::new(&SecretEncryptionConfig {
            master_key_base64: base64::engine::general_purpose::STANDARD.encode([0x13u8; 32]),
        })
        .unwrap();

        let result = other.decrypt(&ciphertext, &nonce);
        assert!(matches!(result, Err(Error::Decryption { .. })));
    }

    #[test]
    fn test_invalid_nonce_length_fails() {
        let encryption = test_encryption();
        let (ciphertext, _nonce) = encryption.encrypt(b"test").unwrap();

        let result = encryption.decrypt(&ciphertext, &[0u8; 8]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_key_length() {
        let config = SecretEncryptionConfig {
            master_key_base64: base64::engine::general_purpose::STANDARD.encode(vec![0u8; 16]),
        };

        let result = SecretEncryption::new(&config);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_key_fingerprint_is_stable_and_key_dependent() {
        let encryption = test_encryption();
        assert_eq!(encryption.key_fingerprint(), encryption.key_fingerprint());
        assert_eq!(encryption.key_fingerprint().len(), 64);

        let other = SecretEncryption::new(&SecretEncryptionConfig {
            master_key_base64: base64::engine::general_purpose::STANDARD.encode([0x13u8; 32]),
        })
        .unwrap();
        assert_ne!(encryption.key_fingerprint(), other.key_fingerprint());
    }

    #[test]
    fn test_sha256_hex() {
        // Known vector for the empty input
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
