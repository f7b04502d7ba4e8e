//! `lockify rotate-key` — change the vault passphrase.
//!
//! Every entry is decrypted with the current passphrase and re-encrypted
//! under a new salt and the new passphrase. The vault file is only
//! replaced once all entries succeeded.

use crate::cli::{output, Runtime};
use crate::crypto::Passphrase;
use crate::errors::{LockifyError, Result};

/// Variable read for the new passphrase in non-interactive runs.
pub const NEW_PASSPHRASE_VAR: &str = "LOCKIFY_NEW_PASSPHRASE";

/// Execute the `rotate-key` command.
pub fn execute(rt: &Runtime) -> Result<()> {
    let vctx = rt.context();

    let current = match non_empty_var(rt, &rt.settings.passphrase_env) {
        Some(p) => p,
        None => rt
            .prompt
            .get_passphrase_input(&format!("Current passphrase for '{}'", rt.env))?,
    };

    let new = match non_empty_var(rt, NEW_PASSPHRASE_VAR) {
        Some(p) => p,
        None => {
            let new = rt.prompt.get_passphrase_input("New passphrase")?;
            let confirm = rt.prompt.get_passphrase_input("Confirm new passphrase")?;
            if new != confirm {
                return Err(LockifyError::PassphraseMismatch);
            }
            new
        }
    };

    if current == new {
        return Err(LockifyError::Validation(
            "new passphrase must differ from the current one".into(),
        ));
    }

    let count = rt.app.rotate(&vctx, &current, &new)?;

    output::success(&format!(
        "Passphrase rotated for '{}' vault ({count} entries re-encrypted)",
        rt.env
    ));
    output::tip("Any cached passphrase for this environment was cleared.");

    Ok(())
}

fn non_empty_var(rt: &Runtime, name: &str) -> Option<Passphrase> {
    rt.environment
        .var(name)
        .filter(|v| !v.is_empty())
        .map(Passphrase::new)
}
