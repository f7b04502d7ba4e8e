//! Create, open, save and rotate vaults.
//!
//! `VaultService` is the only place that combines the repository, the
//! passphrase resolver and the fingerprint check. Opening is fail-closed:
//! a passphrase that does not match the stored fingerprint is removed from
//! the credential cache before the error is returned.

use std::sync::Arc;

use super::model::Vault;
use super::repository::VaultRepository;
use crate::context::VaultContext;
use crate::crypto::{EncryptionService, HashService, Passphrase, DEFAULT_SALT_SIZE};
use crate::errors::{LockifyError, Result};
use crate::passphrase::PassphraseService;

pub struct VaultService {
    repo: Arc<dyn VaultRepository>,
    passphrases: Arc<PassphraseService>,
    hasher: Arc<dyn HashService>,
    salt_size: usize,
}

impl VaultService {
    pub fn new(
        repo: Arc<dyn VaultRepository>,
        passphrases: Arc<PassphraseService>,
        hasher: Arc<dyn HashService>,
    ) -> Self {
        Self {
            repo,
            passphrases,
            hasher,
            salt_size: DEFAULT_SALT_SIZE,
        }
    }

    /// Use `n` bytes of salt for new vaults and rotations (0 means the default).
    pub fn with_salt_size(mut self, n: usize) -> Self {
        self.salt_size = n;
        self
    }

    pub fn passphrases(&self) -> &PassphraseService {
        &self.passphrases
    }

    /// Create and persist an empty vault for `vctx.env`.
    ///
    /// The returned vault is already unlocked with the new passphrase.
    pub fn create(&self, vctx: &VaultContext) -> Result<Vault> {
        vctx.check()?;
        if self.repo.exists(vctx)? {
            return Err(LockifyError::VaultAlreadyExists(vctx.env.clone()));
        }

        let passphrase = self.passphrases.get_with_confirmation(vctx)?;
        let fingerprint = self.hasher.hash(&passphrase)?;
        let salt = self.hasher.generate_salt(self.salt_size)?;

        let mut vault = Vault::new(vctx.env.clone(), fingerprint, salt)?;
        self.repo.create(vctx, &mut vault)?;
        vault.attach_verified_passphrase(passphrase);

        tracing::debug!(env = %vctx.env, "vault created");
        Ok(vault)
    }

    /// Load the vault for `vctx.env` and unlock it with the resolved passphrase.
    pub fn open(&self, vctx: &VaultContext) -> Result<Vault> {
        self.ensure_exists(vctx)?;

        let passphrase = self.passphrases.get(vctx)?;
        let mut vault = self.repo.load(vctx)?;

        if let Err(e) = self.passphrases.validate(vctx, &vault, &passphrase) {
            if let Err(clear_err) = self.passphrases.clear(vctx) {
                tracing::warn!(env = %vctx.env, error = %clear_err, "failed to clear cached passphrase");
            }
            return Err(e);
        }

        vault.attach_verified_passphrase(passphrase);
        Ok(vault)
    }

    pub fn save(&self, vctx: &VaultContext, vault: &mut Vault) -> Result<()> {
        vctx.check()?;
        self.repo.save(vctx, vault)
    }

    /// Re-encrypt the vault under `new` and persist it.
    ///
    /// The cached passphrase for the environment is dropped afterwards, since
    /// it no longer unlocks the vault.
    pub fn rotate(
        &self,
        vctx: &VaultContext,
        current: &Passphrase,
        new: &Passphrase,
        encryption: &dyn EncryptionService,
    ) -> Result<Vault> {
        self.ensure_exists(vctx)?;

        let mut vault = self.repo.load(vctx)?;
        vault
            .rotate_passphrase(current, new, encryption, self.hasher.as_ref(), self.salt_size)
            .map_err(|e| e.context(format!("rotate '{}'", vctx.env)))?;
        self.repo.save(vctx, &mut vault)?;

        if let Err(e) = self.passphrases.clear(vctx) {
            tracing::warn!(env = %vctx.env, error = %e, "failed to clear cached passphrase");
        }
        Ok(vault)
    }

    /// Verify `passphrase` against the stored vault and cache it.
    pub fn remember_passphrase(&self, vctx: &VaultContext, passphrase: &Passphrase) -> Result<()> {
        self.ensure_exists(vctx)?;

        let vault = self.repo.load(vctx)?;
        self.passphrases.validate(vctx, &vault, passphrase)?;
        self.passphrases.cache(vctx, passphrase)
    }

    /// An `exists` error is returned as is; only a clean `false` becomes not-found.
    fn ensure_exists(&self, vctx: &VaultContext) -> Result<()> {
        vctx.check()?;
        let exists = self
            .repo
            .exists(vctx)
            .map_err(|e| e.context(format!("check vault '{}'", vctx.env)))?;
        if !exists {
            return Err(LockifyError::VaultNotFound(vctx.env.clone()));
        }
        Ok(())
    }
}
