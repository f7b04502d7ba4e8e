use std::fmt;

use thiserror::Error;

/// All errors that can occur in Lockify.
#[derive(Debug, Error)]
pub enum LockifyError {
    // --- Input errors ---
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Passphrase mismatch — passphrases do not match")]
    PassphraseMismatch,

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    // --- Vault errors ---
    #[error("Vault for environment '{0}' not found — run `lockify init` first")]
    VaultNotFound(String),

    #[error("Vault for environment '{0}' already exists")]
    VaultAlreadyExists(String),

    #[error("Key '{0}' not found")]
    EntryNotFound(String),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Keyring errors ---
    #[error("Keyring error: {0}")]
    KeyringError(String),

    // --- Config errors ---
    #[error("Config error: {0}")]
    ConfigError(String),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Prompt failed: {0}")]
    PromptFailed(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Coarse error category, stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    NotFound,
    Exists,
    Io,
    Config,
    Crypto,
    Cancelled,
}

impl LockifyError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::PassphraseMismatch
            | Self::SerializationError(_)
            | Self::CommandFailed(_) => ErrorKind::Validation,
            Self::AuthenticationFailed(_) => ErrorKind::Authentication,
            Self::VaultNotFound(_) | Self::EntryNotFound(_) => ErrorKind::NotFound,
            Self::VaultAlreadyExists(_) => ErrorKind::Exists,
            Self::InvalidVaultFormat(_)
            | Self::Storage(_)
            | Self::Io(_)
            | Self::KeyringError(_)
            | Self::PromptFailed(_) => ErrorKind::Io,
            Self::ConfigError(_) => ErrorKind::Config,
            Self::EncryptionFailed(_) => ErrorKind::Crypto,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Prefix the message with `ctx`, keeping the variant (and therefore the kind).
    ///
    /// Variants that carry a name rather than a message are returned as-is.
    pub fn context(self, ctx: impl fmt::Display) -> Self {
        match self {
            Self::Validation(m) => Self::Validation(format!("{ctx}: {m}")),
            Self::EncryptionFailed(m) => Self::EncryptionFailed(format!("{ctx}: {m}")),
            Self::AuthenticationFailed(m) => Self::AuthenticationFailed(format!("{ctx}: {m}")),
            Self::InvalidVaultFormat(m) => Self::InvalidVaultFormat(format!("{ctx}: {m}")),
            Self::Storage(m) => Self::Storage(format!("{ctx}: {m}")),
            Self::Io(e) => Self::Storage(format!("{ctx}: {e}")),
            Self::KeyringError(m) => Self::KeyringError(format!("{ctx}: {m}")),
            Self::ConfigError(m) => Self::ConfigError(format!("{ctx}: {m}")),
            Self::SerializationError(m) => Self::SerializationError(format!("{ctx}: {m}")),
            Self::PromptFailed(m) => Self::PromptFailed(format!("{ctx}: {m}")),
            Self::CommandFailed(m) => Self::CommandFailed(format!("{ctx}: {m}")),
            other => other,
        }
    }
}

/// Convenience type alias for Lockify results.
pub type Result<T> = std::result::Result<T, LockifyError>;
