//! Use cases behind the CLI commands.
//!
//! Each method opens the vault through `VaultService` (so passphrase
//! resolution and the fail-closed fingerprint check always run), does its
//! work with the `EncryptionService`, and saves only when something changed.

use std::collections::BTreeMap;
use std::sync::Arc;

use zeroize::{Zeroize, Zeroizing};

use crate::context::VaultContext;
use crate::crypto::{EncryptionService, Passphrase};
use crate::errors::{LockifyError, Result};
use crate::vault::{EntryMetadata, Vault, VaultService};

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Entry point for every vault use case.
pub struct Lockify {
    vaults: Arc<VaultService>,
    encryption: Arc<dyn EncryptionService>,
}

impl Lockify {
    pub fn new(vaults: Arc<VaultService>, encryption: Arc<dyn EncryptionService>) -> Self {
        Self { vaults, encryption }
    }

    pub fn vaults(&self) -> &VaultService {
        &self.vaults
    }

    /// Create the vault for `vctx.env`.
    pub fn init(&self, vctx: &VaultContext) -> Result<Vault> {
        self.vaults.create(vctx)
    }

    /// Encrypt and store `value` under `key`. Returns whether the key existed.
    pub fn add_entry(&self, vctx: &VaultContext, key: &str, value: &str) -> Result<bool> {
        let mut vault = self.vaults.open(vctx)?;
        let existed = vault.contains_key(key);

        let ciphertext = self.encrypt_for(&vault, value)?;
        vault
            .set_entry(key, ciphertext)
            .map_err(|e| e.context(format!("set '{key}'")))?;
        self.vaults.save(vctx, &mut vault)?;

        tracing::debug!(env = %vctx.env, key = %key, updated = existed, "entry stored");
        Ok(existed)
    }

    /// Decrypt the value stored under `key`.
    pub fn get_entry(&self, vctx: &VaultContext, key: &str) -> Result<Zeroizing<String>> {
        let vault = self.vaults.open(vctx)?;
        let entry = vault.get_entry(key)?;
        self.decrypt_for(&vault, key, &entry.value)
    }

    pub fn delete_entry(&self, vctx: &VaultContext, key: &str) -> Result<()> {
        let mut vault = self.vaults.open(vctx)?;
        vault.delete_entry(key)?;
        self.vaults.save(vctx, &mut vault)
    }

    /// Key names and timestamps, sorted by name.
    pub fn list_entries(&self, vctx: &VaultContext) -> Result<Vec<EntryMetadata>> {
        let vault = self.vaults.open(vctx)?;
        Ok(vault.list_entries())
    }

    /// Add parsed key/value pairs. Existing keys are skipped unless `overwrite`.
    ///
    /// Nothing is written when every key was skipped.
    pub fn import_entries(
        &self,
        vctx: &VaultContext,
        entries: &BTreeMap<String, String>,
        overwrite: bool,
    ) -> Result<ImportSummary> {
        if entries.is_empty() {
            return Err(LockifyError::Validation("no entries found to import".into()));
        }

        let mut vault = self.vaults.open(vctx)?;
        let mut summary = ImportSummary::default();

        for (key, value) in entries {
            if vault.contains_key(key) && !overwrite {
                tracing::warn!(key = %key, "skipping existing key (use --overwrite to replace)");
                summary.skipped += 1;
                continue;
            }

            let ciphertext = self.encrypt_for(&vault, value)?;
            vault
                .set_entry(key, ciphertext)
                .map_err(|e| e.context(format!("import '{key}'")))?;
            summary.imported += 1;
        }

        if summary.imported > 0 {
            self.vaults.save(vctx, &mut vault)?;
        }
        Ok(summary)
    }

    /// Every entry decrypted, keyed by name.
    pub fn export_entries(
        &self,
        vctx: &VaultContext,
    ) -> Result<BTreeMap<String, Zeroizing<String>>> {
        let vault = self.vaults.open(vctx)?;
        let mut out = BTreeMap::new();

        vault.for_each_entry(|key, entry| {
            let value = self.decrypt_for(&vault, key, &entry.value)?;
            out.insert(key.to_string(), value);
            Ok(())
        })?;

        Ok(out)
    }

    /// Change the passphrase of `vctx.env`. Returns how many entries were re-encrypted.
    pub fn rotate(&self, vctx: &VaultContext, current: &Passphrase, new: &Passphrase) -> Result<usize> {
        let vault = self
            .vaults
            .rotate(vctx, current, new, self.encryption.as_ref())?;
        Ok(vault.entries_count())
    }

    /// Verify `passphrase` and store it in the credential cache.
    pub fn cache_passphrase(&self, vctx: &VaultContext, passphrase: &Passphrase) -> Result<()> {
        self.vaults.remember_passphrase(vctx, passphrase)
    }

    pub fn clear_cached_passphrase(&self, vctx: &VaultContext) -> Result<()> {
        self.vaults.passphrases().clear(vctx)
    }

    pub fn clear_all_cached_passphrases(&self, vctx: &VaultContext) -> Result<()> {
        self.vaults.passphrases().clear_all(vctx)
    }

    fn encrypt_for(&self, vault: &Vault, value: &str) -> Result<String> {
        let passphrase = vault.require_passphrase()?;
        self.encryption
            .encrypt(value.as_bytes(), vault.salt(), passphrase)
    }

    fn decrypt_for(&self, vault: &Vault, key: &str, ciphertext: &str) -> Result<Zeroizing<String>> {
        let passphrase = vault.require_passphrase()?;
        let mut plaintext = self
            .encryption
            .decrypt(ciphertext, vault.salt(), passphrase)
            .map_err(|e| e.context(format!("decrypt '{key}'")))?;

        // Take the bytes out of the zeroizing buffer without copying.
        let bytes = std::mem::take(&mut *plaintext);
        String::from_utf8(bytes).map(Zeroizing::new).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            LockifyError::SerializationError(format!("value of '{key}' is not valid UTF-8"))
        })
    }
}
