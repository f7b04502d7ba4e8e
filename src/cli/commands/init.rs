//! `lockify init` — create a new vault for the environment.

use crate::cli::{output, Runtime};
use crate::errors::{LockifyError, Result};

/// Execute the `init` command.
pub fn execute(rt: &Runtime) -> Result<()> {
    let vctx = rt.context();

    let vault = match rt.app.init(&vctx) {
        Ok(vault) => vault,
        Err(e @ LockifyError::VaultAlreadyExists(_)) => {
            output::tip("Use `lockify add` to add entries to the existing vault.");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    output::success(&format!(
        "Vault created for '{}' environment at {}",
        vault.env(),
        rt.vault_path().display()
    ));

    if rt.project_dir.join(".env").exists() {
        output::tip(&format!(
            "Found .env — run `lockify import .env -e {}` to import it.",
            vault.env()
        ));
    }
    output::tip("Run `lockify add <KEY>` to add an entry.");
    output::tip("Run `lockify list` to see all entries.");

    Ok(())
}
