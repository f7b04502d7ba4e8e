//! Entry, EntryMetadata and Meta types stored inside a vault.
//!
//! An entry holds the base64 ciphertext of one value plus its creation
//! and update timestamps (RFC 3339 in JSON).  `Meta` is the only
//! authentication/derivation material persisted next to the entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single encrypted value stored in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// `base64(nonce || ciphertext || tag)`, never empty.
    pub value: String,

    /// When this key was first written. Never changes afterwards.
    pub created_at: DateTime<Utc>,

    /// When this key was last written.
    pub updated_at: DateTime<Utc>,
}

/// Lightweight metadata about an entry (no ciphertext).
///
/// Returned by `Vault::list_entries` so callers can display key names
/// and timestamps without touching any ciphertext.
#[derive(Debug, Clone)]
pub struct EntryMetadata {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Vault header: environment name, key-derivation salt and passphrase fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub env: String,

    /// Base64 salt for Argon2id key derivation. Public, replaced on rotation.
    pub salt: String,

    /// One-way fingerprint of the passphrase (PHC string).
    pub fingerprint: String,
}
