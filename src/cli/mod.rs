//! CLI module — Clap argument parser, service wiring, output helpers, and
//! command implementations.

pub mod commands;
pub mod formats;
pub mod output;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::app::Lockify;
use crate::cache::CredentialCache;
use crate::config::Settings;
use crate::context::{validate_env_name, VaultContext};
use crate::crypto::{AesGcmEncryption, PhcHashService};
use crate::environment::{EnvironmentProvider, OsEnvironment};
use crate::errors::Result;
use crate::passphrase::PassphraseService;
use crate::prompt::{PromptService, TerminalPrompt};
use crate::storage::OsFileSystem;
use crate::vault::{FileVaultRepository, VaultService};
use formats::FileFormat;

/// Lockify CLI: local encrypted per-environment secret vaults.
#[derive(Parser)]
#[command(
    name = "lockify",
    about = "Local encrypted secret vaults, one per environment",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Environment to use (default: `default_environment` from .lockify.toml, else "local")
    #[arg(short, long, global = true)]
    pub env: Option<String>,

    /// Vault directory (default: `vault_dir` from .lockify.toml, else .lockify)
    #[arg(long, global = true)]
    pub vault_dir: Option<String>,

    /// Cache a prompted passphrase in the OS keyring without asking
    #[arg(long, global = true)]
    pub cache: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault for the environment
    Init,

    /// Add or update an entry (prompts for missing key or value)
    Add {
        /// Entry name (e.g. DATABASE_URL)
        key: Option<String>,
        /// Entry value (omit for interactive prompt or piped stdin)
        value: Option<String>,
        /// Hide the value while typing it
        #[arg(short, long)]
        secret: bool,
    },

    /// Print an entry's decrypted value
    Get {
        /// Entry name
        key: String,
    },

    /// Delete an entry
    Delete {
        /// Entry name
        key: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List entry names with timestamps
    List,

    /// Export decrypted entries to stdout or a file
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = FileFormat::Dotenv)]
        format: FileFormat,

        /// Output file path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import entries from a file (or stdin)
    Import {
        /// File to import (reads stdin if omitted)
        file: Option<PathBuf>,

        /// Input format (auto-detected from the file extension)
        #[arg(short, long, value_enum)]
        format: Option<FileFormat>,

        /// Replace keys that already exist
        #[arg(long)]
        overwrite: bool,
    },

    /// Change the vault passphrase and re-encrypt every entry
    RotateKey,

    /// Manage cached passphrases
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show version information
    Version,
}

/// Cache subcommands.
#[derive(clap::Subcommand)]
pub enum CacheAction {
    /// Verify a passphrase and store it in the OS keyring
    Set,

    /// Remove the cached passphrase for the environment
    Clear {
        /// Remove every cached passphrase
        #[arg(long)]
        all: bool,
    },
}

// ---------------------------------------------------------------------------
// Service wiring shared by every command
// ---------------------------------------------------------------------------

/// Everything a command needs, built once from the CLI arguments.
pub struct Runtime {
    pub settings: Settings,
    pub project_dir: PathBuf,
    pub env: String,
    pub should_cache: bool,
    pub app: Lockify,
    pub prompt: Arc<dyn PromptService>,
    pub environment: Arc<dyn EnvironmentProvider>,
}

impl Runtime {
    /// Load settings from the current directory and wire up the services.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_dir = std::env::current_dir()?;
        let mut settings = Settings::load(&project_dir)?;
        if let Some(dir) = &cli.vault_dir {
            settings.vault_dir = dir.clone();
        }

        let env = cli
            .env
            .clone()
            .unwrap_or_else(|| settings.default_environment.clone());
        validate_env_name(&env)?;

        let hasher = Arc::new(PhcHashService::new(settings.fingerprint_params()));
        let encryption = Arc::new(AesGcmEncryption::new(settings.argon2_params()));
        let prompt: Arc<dyn PromptService> = Arc::new(TerminalPrompt);
        let environment: Arc<dyn EnvironmentProvider> = Arc::new(OsEnvironment);

        let passphrases = Arc::new(
            PassphraseService::new(
                credential_cache(&settings),
                hasher.clone(),
                prompt.clone(),
                environment.clone(),
            )
            .with_override_var(settings.passphrase_env.clone())
            .with_caching_offer(cfg!(feature = "keyring-store") && std::io::stdin().is_terminal()),
        );

        let repo = Arc::new(FileVaultRepository::new(
            OsFileSystem,
            settings.vault_base_dir(&project_dir),
        ));
        let vaults = Arc::new(
            VaultService::new(repo, passphrases, hasher).with_salt_size(settings.salt_size),
        );

        Ok(Self {
            app: Lockify::new(vaults, encryption),
            settings,
            project_dir,
            env,
            should_cache: cli.cache,
            prompt,
            environment,
        })
    }

    /// A fresh context for one vault operation.
    pub fn context(&self) -> VaultContext {
        VaultContext::new(self.env.clone(), self.should_cache)
    }

    pub fn vault_path(&self) -> PathBuf {
        self.settings.vault_path(&self.project_dir, &self.env)
    }
}

#[cfg(feature = "keyring-store")]
fn credential_cache(settings: &Settings) -> Arc<dyn CredentialCache> {
    Arc::new(crate::cache::KeyringCache::new(settings.keyring_service.clone()))
}

#[cfg(not(feature = "keyring-store"))]
fn credential_cache(_settings: &Settings) -> Arc<dyn CredentialCache> {
    Arc::new(crate::cache::NullCache)
}
