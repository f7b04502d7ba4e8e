//! On-disk vault document.
//!
//! A `<env>.vault.enc` file is indented JSON:
//!
//! ```text
//! {
//!   "meta": { "env": "...", "salt": "<base64>", "fingerprint": "<phc>" },
//!   "entries": {
//!     "<key>": { "value": "<base64>", "created_at": "<RFC3339>", "updated_at": "<RFC3339>" }
//!   }
//! }
//! ```
//!
//! The in-memory passphrase and the file path are never serialized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entry::{Entry, Meta};
use super::model::Vault;
use crate::errors::{LockifyError, Result};

/// Borrowed view used for writing, so saving never clones ciphertext.
#[derive(Serialize)]
struct VaultDocumentRef<'a> {
    meta: &'a Meta,
    entries: &'a BTreeMap<String, Entry>,
}

/// Owned form used for reading.
#[derive(Deserialize)]
struct VaultDocument {
    meta: Meta,
    #[serde(default)]
    entries: Option<BTreeMap<String, Entry>>,
}

/// Serialize a vault to indented JSON bytes.
pub fn encode(vault: &Vault) -> Result<Vec<u8>> {
    let doc = VaultDocumentRef {
        meta: vault.meta(),
        entries: vault.entries(),
    };
    serde_json::to_vec_pretty(&doc)
        .map_err(|e| LockifyError::SerializationError(format!("vault: {e}")))
}

/// Parse vault JSON bytes, checking the entity invariants on the way in.
///
/// A missing or `null` entries object is read as an empty vault.
pub fn decode(bytes: &[u8]) -> Result<Vault> {
    let doc: VaultDocument = serde_json::from_slice(bytes)
        .map_err(|e| LockifyError::InvalidVaultFormat(format!("vault JSON: {e}")))?;

    let entries = doc.entries.unwrap_or_default();
    Vault::from_parts(doc.meta, entries)
        .map_err(|e| LockifyError::InvalidVaultFormat(e.to_string()))
}
