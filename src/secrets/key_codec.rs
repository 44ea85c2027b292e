//! Escaping of reserved characters in logical secret keys.
//!
//! Vault treats `/` as a path separator, so a logical key like
//! `production/app/db-password` would otherwise be split into nested folders.
//! Every literal `/` inside the logical key is percent-encoded before a path
//! operation and decoded on enumeration, keeping one vault node per key.

const SLASH: char = '/';
const ENCODED_SLASH: &str = "%2F";

/// Encode a logical key for use as a single vault path segment.
pub fn encode(key: &str) -> String {
    key.replace(SLASH, ENCODED_SLASH)
}

/// Reverse [`encode`] on a key listed from the backend.
pub fn decode(encoded: &str) -> String {
    encoded.replace(ENCODED_SLASH, "/")
}
