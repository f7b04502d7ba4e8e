//! Passphrase resolution and caching.
//!
//! The working passphrase for an environment comes from, in order:
//! 1. the override environment variable (`LOCKIFY_PASSPHRASE` by default)
//! 2. the credential cache, under `env:<name>`
//! 3. an interactive prompt
//!
//! A prompted passphrase may then be cached, either because the caller
//! asked for it (`VaultContext::should_cache`) or because the user agreed.

use std::sync::Arc;

use crate::cache::{cache_key, CredentialCache};
use crate::context::VaultContext;
use crate::crypto::{HashService, Passphrase};
use crate::environment::EnvironmentProvider;
use crate::errors::{LockifyError, Result};
use crate::prompt::PromptService;
use crate::vault::Vault;

/// Default override variable name.
pub const DEFAULT_OVERRIDE_VAR: &str = "LOCKIFY_PASSPHRASE";

pub struct PassphraseService {
    cache: Arc<dyn CredentialCache>,
    hasher: Arc<dyn HashService>,
    prompt: Arc<dyn PromptService>,
    environment: Arc<dyn EnvironmentProvider>,
    override_var: String,
    /// Offer to cache a prompted passphrase when the caller did not ask.
    offer_caching: bool,
}

impl PassphraseService {
    pub fn new(
        cache: Arc<dyn CredentialCache>,
        hasher: Arc<dyn HashService>,
        prompt: Arc<dyn PromptService>,
        environment: Arc<dyn EnvironmentProvider>,
    ) -> Self {
        Self {
            cache,
            hasher,
            prompt,
            environment,
            override_var: DEFAULT_OVERRIDE_VAR.to_string(),
            offer_caching: false,
        }
    }

    /// Read the override from `name` instead of `LOCKIFY_PASSPHRASE`.
    pub fn with_override_var(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.override_var = name;
        }
        self
    }

    /// Ask the user whether to cache a prompted passphrase.
    pub fn with_caching_offer(mut self, offer: bool) -> Self {
        self.offer_caching = offer;
        self
    }

    /// Resolve the passphrase for `vctx.env`: override, then cache, then prompt.
    pub fn get(&self, vctx: &VaultContext) -> Result<Passphrase> {
        vctx.check()?;

        if let Some(passphrase) = self.from_override() {
            tracing::debug!(env = %vctx.env, source = %self.override_var, "passphrase from override");
            return Ok(passphrase);
        }

        match self.cache.get(&cache_key(&vctx.env)) {
            Ok(Some(passphrase)) if !passphrase.is_empty() => {
                tracing::debug!(env = %vctx.env, "passphrase from cache");
                return Ok(passphrase);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(env = %vctx.env, error = %e, "credential cache unavailable");
            }
        }

        let passphrase = self
            .prompt
            .get_passphrase_input(&format!("Enter passphrase for environment '{}'", vctx.env))?;
        if passphrase.is_empty() {
            return Err(LockifyError::Validation("passphrase cannot be empty".into()));
        }

        self.maybe_cache(vctx, &passphrase)?;
        Ok(passphrase)
    }

    /// Ask for a new passphrase twice. Used only when creating a vault.
    ///
    /// The override variable is honoured so vaults can be created
    /// non-interactively.
    pub fn get_with_confirmation(&self, vctx: &VaultContext) -> Result<Passphrase> {
        vctx.check()?;

        if let Some(passphrase) = self.from_override() {
            tracing::debug!(env = %vctx.env, source = %self.override_var, "new passphrase from override");
            return Ok(passphrase);
        }

        let passphrase = self
            .prompt
            .get_passphrase_input(&format!("Choose a passphrase for environment '{}'", vctx.env))?;
        if passphrase.is_empty() {
            return Err(LockifyError::Validation("passphrase cannot be empty".into()));
        }

        let confirmation = self.prompt.get_passphrase_input("Confirm passphrase")?;
        if passphrase != confirmation {
            return Err(LockifyError::PassphraseMismatch);
        }

        self.maybe_cache(vctx, &passphrase)?;
        Ok(passphrase)
    }

    /// Store `passphrase` for `vctx.env`. Errors propagate.
    pub fn cache(&self, vctx: &VaultContext, passphrase: &Passphrase) -> Result<()> {
        vctx.check()?;
        if passphrase.is_empty() {
            return Err(LockifyError::Validation("passphrase cannot be empty".into()));
        }
        self.cache
            .set(&cache_key(&vctx.env), passphrase)
            .map_err(|e| e.context(format!("cache passphrase for '{}'", vctx.env)))
    }

    /// Like `cache`, but a failure is only logged.
    pub fn cache_best_effort(&self, vctx: &VaultContext, passphrase: &Passphrase) {
        if let Err(e) = self.cache(vctx, passphrase) {
            tracing::warn!(env = %vctx.env, error = %e, "could not cache passphrase");
        }
    }

    /// Forget the cached passphrase for `vctx.env`.
    pub fn clear(&self, vctx: &VaultContext) -> Result<()> {
        vctx.check()?;
        self.cache
            .delete(&cache_key(&vctx.env))
            .map_err(|e| e.context(format!("clear cached passphrase for '{}'", vctx.env)))
    }

    /// Forget every cached passphrase.
    pub fn clear_all(&self, vctx: &VaultContext) -> Result<()> {
        if vctx.token.is_cancelled() {
            return Err(LockifyError::Cancelled);
        }
        self.cache
            .delete_all()
            .map_err(|e| e.context("clear cached passphrases"))
    }

    /// Check `passphrase` against the vault's stored fingerprint.
    pub fn validate(&self, vctx: &VaultContext, vault: &Vault, passphrase: &Passphrase) -> Result<()> {
        vctx.check()?;
        if passphrase.is_empty() {
            return Err(LockifyError::Validation("passphrase cannot be empty".into()));
        }
        self.hasher.verify(vault.fingerprint(), passphrase)
    }

    fn from_override(&self) -> Option<Passphrase> {
        self.environment
            .var(&self.override_var)
            .filter(|v| !v.is_empty())
            .map(Passphrase::new)
    }

    fn maybe_cache(&self, vctx: &VaultContext, passphrase: &Passphrase) -> Result<()> {
        let wanted = if vctx.should_cache {
            true
        } else if self.offer_caching {
            self.prompt.get_confirmation(
                &format!("Cache the passphrase for '{}' in the OS keyring?", vctx.env),
                false,
            )?
        } else {
            false
        };

        if wanted {
            self.cache_best_effort(vctx, passphrase);
        }
        Ok(())
    }
}
