use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::Argon2Params;
use crate::errors::{LockifyError, Result};

/// Project-level configuration, loaded from `.lockify.toml`.
///
/// Every field has a sensible default so Lockify works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Which environment to use when none is specified.
    #[serde(default = "default_environment")]
    pub default_environment: String,

    /// Directory (relative to project root) where vault files are stored.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// Environment variable that overrides every other passphrase source.
    #[serde(default = "default_passphrase_env")]
    pub passphrase_env: String,

    /// Service namespace for cached passphrases in the OS keyring.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Bytes of random salt generated on init and rotation.
    #[serde(default = "default_salt_size")]
    pub salt_size: usize,

    /// Argon2 memory cost in KiB for entry encryption (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Argon2 cost parameters for the passphrase fingerprint.
    #[serde(default = "default_fingerprint_memory_kib")]
    pub fingerprint_memory_kib: u32,

    #[serde(default = "default_fingerprint_iterations")]
    pub fingerprint_iterations: u32,

    #[serde(default = "default_fingerprint_parallelism")]
    pub fingerprint_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_environment() -> String {
    "local".to_string()
}

fn default_vault_dir() -> String {
    ".lockify".to_string()
}

fn default_passphrase_env() -> String {
    "LOCKIFY_PASSPHRASE".to_string()
}

fn default_keyring_service() -> String {
    "lockify".to_string()
}

fn default_salt_size() -> usize {
    crate::crypto::DEFAULT_SALT_SIZE
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_fingerprint_memory_kib() -> u32 {
    19_456 // 19 MB
}

fn default_fingerprint_iterations() -> u32 {
    2
}

fn default_fingerprint_parallelism() -> u32 {
    1
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_environment: default_environment(),
            vault_dir: default_vault_dir(),
            passphrase_env: default_passphrase_env(),
            keyring_service: default_keyring_service(),
            salt_size: default_salt_size(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            fingerprint_memory_kib: default_fingerprint_memory_kib(),
            fingerprint_iterations: default_fingerprint_iterations(),
            fingerprint_parallelism: default_fingerprint_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".lockify.toml";

    /// Load settings from `<project_dir>/.lockify.toml`.
    ///
    /// If the file does not exist, defaults are returned. If it exists but
    /// cannot be parsed or carries unsafe KDF parameters, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            LockifyError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        tracing::debug!(path = %config_path.display(), "loaded settings");
        Ok(settings)
    }

    /// Check the values a TOML file cannot constrain by type alone.
    pub fn validate(&self) -> Result<()> {
        if self.default_environment.is_empty() {
            return Err(LockifyError::ConfigError(
                "default_environment cannot be empty".into(),
            ));
        }
        if self.vault_dir.is_empty() {
            return Err(LockifyError::ConfigError("vault_dir cannot be empty".into()));
        }
        if self.passphrase_env.is_empty() {
            return Err(LockifyError::ConfigError(
                "passphrase_env cannot be empty".into(),
            ));
        }
        self.argon2_params()
            .validate()
            .map_err(|e| e.context("argon2"))?;
        self.fingerprint_params()
            .validate()
            .map_err(|e| e.context("fingerprint"))?;
        Ok(())
    }

    /// Build the full path to a vault file for a given environment.
    ///
    /// Example: `project_dir/.lockify/dev.vault.enc`
    pub fn vault_path(&self, project_dir: &Path, env_name: &str) -> PathBuf {
        self.vault_base_dir(project_dir)
            .join(format!("{env_name}.vault.enc"))
    }

    /// The directory holding every environment's vault file.
    pub fn vault_base_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_dir)
    }

    /// Key-derivation parameters for entry encryption.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Cost parameters for new passphrase fingerprints.
    pub fn fingerprint_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.fingerprint_memory_kib,
            iterations: self.fingerprint_iterations,
            parallelism: self.fingerprint_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
