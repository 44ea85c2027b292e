//! Process-wide services shared by the secret backends.

pub mod secret_encryption;

pub use secret_encryption::{sha256_hex, SecretEncryption, SecretEncryptionConfig};
