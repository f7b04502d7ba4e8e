//! The `Vault` entity: one environment's encrypted entries plus its header.
//!
//! A `Vault` never sees plaintext on its own. Callers encrypt values with an
//! `EncryptionService` and hand the ciphertext to `set_entry`. The only
//! operation that touches plaintext is `rotate_passphrase`, which needs to
//! re-encrypt everything under a new key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::entry::{Entry, EntryMetadata, Meta};
use crate::crypto::{EncryptionService, HashService, Passphrase};
use crate::errors::{LockifyError, Result};

/// In-memory vault for a single environment.
#[derive(Debug, Clone)]
pub struct Vault {
    meta: Meta,

    /// Entries keyed by name. Ordered so iteration and output are stable.
    entries: BTreeMap<String, Entry>,

    /// Where the vault was loaded from or will be saved to.
    path: Option<PathBuf>,

    /// Set only after the fingerprint check passed. Never serialized.
    passphrase: Option<Passphrase>,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create an empty vault for `env` with a fresh fingerprint and salt.
    pub fn new(
        env: impl Into<String>,
        fingerprint: impl Into<String>,
        salt: impl Into<String>,
    ) -> Result<Self> {
        let meta = Meta {
            env: env.into(),
            salt: salt.into(),
            fingerprint: fingerprint.into(),
        };
        Self::from_parts(meta, BTreeMap::new())
    }

    /// Rebuild a vault from persisted parts, checking every invariant.
    pub fn from_parts(meta: Meta, entries: BTreeMap<String, Entry>) -> Result<Self> {
        if meta.env.is_empty() {
            return Err(LockifyError::Validation("environment cannot be empty".into()));
        }
        if meta.salt.is_empty() {
            return Err(LockifyError::Validation("salt cannot be empty".into()));
        }
        if meta.fingerprint.is_empty() {
            return Err(LockifyError::Validation("fingerprint cannot be empty".into()));
        }
        for (key, entry) in &entries {
            validate_key(key)?;
            if entry.value.is_empty() {
                return Err(LockifyError::Validation(format!(
                    "entry '{key}' has an empty value"
                )));
            }
        }

        Ok(Self {
            meta,
            entries,
            path: None,
            passphrase: None,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn env(&self) -> &str {
        &self.meta.env
    }

    pub fn salt(&self) -> &str {
        &self.meta.salt
    }

    pub fn fingerprint(&self) -> &str {
        &self.meta.fingerprint
    }

    pub fn entries(&self) -> &BTreeMap<String, Entry> {
        &self.entries
    }

    pub fn entries_count(&self) -> usize {
        self.entries.len()
    }

    /// Metadata-only check, no decryption.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// The verified passphrase, if the vault has been unlocked.
    pub fn passphrase(&self) -> Option<&Passphrase> {
        self.passphrase.as_ref()
    }

    /// The verified passphrase, or an authentication error if the vault is locked.
    pub fn require_passphrase(&self) -> Result<&Passphrase> {
        self.passphrase.as_ref().ok_or_else(|| {
            LockifyError::AuthenticationFailed(format!(
                "vault '{}' has not been unlocked",
                self.meta.env
            ))
        })
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    pub fn get_entry(&self, key: &str) -> Result<&Entry> {
        validate_key(key)?;
        self.entries
            .get(key)
            .ok_or_else(|| LockifyError::EntryNotFound(key.to_string()))
    }

    /// Insert or update `key` with already-encrypted `value`.
    ///
    /// An update keeps the original `created_at`; `updated_at` is always refreshed.
    pub fn set_entry(&mut self, key: &str, value: String) -> Result<()> {
        validate_key(key)?;
        if value.is_empty() {
            return Err(LockifyError::Validation(format!(
                "value for '{key}' cannot be empty"
            )));
        }

        let now = Utc::now();
        let created_at = self
            .entries
            .get(key)
            .map_or(now, |existing| existing.created_at);

        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                created_at,
                updated_at: now,
            },
        );
        Ok(())
    }

    pub fn delete_entry(&mut self, key: &str) -> Result<()> {
        validate_key(key)?;
        if self.entries.remove(key).is_none() {
            return Err(LockifyError::EntryNotFound(key.to_string()));
        }
        Ok(())
    }

    /// All key names, sorted.
    pub fn list_keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Key names with timestamps, sorted by name.
    pub fn list_entries(&self) -> Vec<EntryMetadata> {
        self.entries
            .iter()
            .map(|(name, entry)| EntryMetadata {
                name: name.clone(),
                created_at: entry.created_at,
                updated_at: entry.updated_at,
            })
            .collect()
    }

    /// Visit every entry in key order, stopping at the first error.
    pub fn for_each_entry<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&str, &Entry) -> Result<()>,
    {
        for (key, entry) in &self.entries {
            f(key, entry)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Passphrase handling
    // ------------------------------------------------------------------

    /// Unlock the vault with `passphrase` if it matches the stored fingerprint.
    pub fn set_passphrase(&mut self, passphrase: &Passphrase, hasher: &dyn HashService) -> Result<()> {
        hasher.verify(&self.meta.fingerprint, passphrase)?;
        self.passphrase = Some(passphrase.clone());
        Ok(())
    }

    /// Attach a passphrase the caller has already verified against this vault.
    pub(crate) fn attach_verified_passphrase(&mut self, passphrase: Passphrase) {
        self.clear_passphrase();
        self.passphrase = Some(passphrase);
    }

    /// Wipe and drop the in-memory passphrase.
    pub fn clear_passphrase(&mut self) {
        if let Some(mut passphrase) = self.passphrase.take() {
            passphrase.clear();
        }
    }

    /// Re-encrypt every entry under a new salt and passphrase.
    ///
    /// Re-encrypted entries are staged in a separate map. The live entries,
    /// salt, fingerprint and passphrase are replaced together only after
    /// every entry succeeded and the new fingerprint was computed. On any
    /// error the vault is left exactly as it was.
    pub fn rotate_passphrase(
        &mut self,
        current: &Passphrase,
        new: &Passphrase,
        encryption: &dyn EncryptionService,
        hasher: &dyn HashService,
        salt_size: usize,
    ) -> Result<()> {
        hasher.verify(&self.meta.fingerprint, current)?;

        if new.is_empty() {
            return Err(LockifyError::Validation(
                "new passphrase cannot be empty".into(),
            ));
        }

        let new_salt = hasher.generate_salt(salt_size)?;
        let now = Utc::now();

        let mut staged = BTreeMap::new();
        for (key, entry) in &self.entries {
            let plaintext = encryption
                .decrypt(&entry.value, &self.meta.salt, current)
                .map_err(|e| e.context(format!("rotate '{key}'")))?;
            let value = encryption
                .encrypt(&plaintext, &new_salt, new)
                .map_err(|e| e.context(format!("rotate '{key}'")))?;

            staged.insert(
                key.clone(),
                Entry {
                    value,
                    created_at: entry.created_at,
                    updated_at: now,
                },
            );
        }

        let new_fingerprint = hasher.hash(new)?;

        self.entries = staged;
        self.meta.salt = new_salt;
        self.meta.fingerprint = new_fingerprint;
        self.attach_verified_passphrase(new.clone());

        tracing::debug!(env = %self.meta.env, entries = self.entries.len(), "passphrase rotated");
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(LockifyError::Validation("key cannot be empty".into()));
    }
    Ok(())
}
