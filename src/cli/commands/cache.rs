//! `lockify cache` — manage passphrases cached in the OS keyring.

use crate::cli::{output, CacheAction, Runtime};
use crate::errors::{LockifyError, Result};

/// Execute a `cache` subcommand.
pub fn execute(rt: &Runtime, action: &CacheAction) -> Result<()> {
    let vctx = rt.context();

    match action {
        CacheAction::Set => {
            let passphrase = rt
                .prompt
                .get_passphrase_input(&format!("Enter passphrase for environment '{}'", rt.env))?;
            if passphrase.is_empty() {
                return Err(LockifyError::Validation("passphrase cannot be empty".into()));
            }

            rt.app.cache_passphrase(&vctx, &passphrase)?;
            output::success(&format!("Passphrase cached for '{}'", rt.env));
        }
        CacheAction::Clear { all: true } => {
            rt.app.clear_all_cached_passphrases(&vctx)?;
            output::success("Cleared all cached passphrases");
        }
        CacheAction::Clear { all: false } => {
            rt.app.clear_cached_passphrase(&vctx)?;
            output::success(&format!("Cleared cached passphrase for '{}'", rt.env));
        }
    }

    Ok(())
}
