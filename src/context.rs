//! Per-operation context threaded through every vault call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::{LockifyError, Result};

/// Cooperative cancellation flag shared between clones.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Which environment an operation targets, and whether a prompted
/// passphrase should be cached without asking.
#[derive(Debug, Clone)]
pub struct VaultContext {
    pub token: CancellationToken,
    pub env: String,
    pub should_cache: bool,
}

impl VaultContext {
    pub fn new(env: impl Into<String>, should_cache: bool) -> Self {
        Self {
            token: CancellationToken::new(),
            env: env.into(),
            should_cache,
        }
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Fail fast if the caller cancelled, or if the environment name
    /// cannot be used as a vault file stem.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(LockifyError::Cancelled);
        }
        validate_env_name(&self.env)
    }
}

const MAX_ENV_NAME: usize = 64;

/// An environment name becomes `<vault_dir>/<name>.vault.enc`, so it must
/// stay a single plain path component: ASCII letters, digits, `-`, `_`
/// and `.`, not starting with a dot, at most 64 bytes.
pub fn validate_env_name(name: &str) -> Result<()> {
    let invalid = |why: &str| {
        Err(LockifyError::Validation(format!(
            "environment name '{name}' is invalid: {why}"
        )))
    };

    if name.is_empty() {
        return invalid("it is empty");
    }
    if name.len() > MAX_ENV_NAME {
        return invalid("it is longer than 64 characters");
    }
    if name.starts_with('.') {
        return invalid("it starts with '.'");
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return invalid(&format!("character {c:?} is not allowed"));
    }
    Ok(())
}
