//! `lockify delete` — remove an entry from the vault.

use crate::cli::{output, Runtime};
use crate::errors::Result;

/// Execute the `delete` command.
pub fn execute(rt: &Runtime, key: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force
        && !rt
            .prompt
            .get_confirmation(&format!("Delete entry '{key}' from '{}'?", rt.env), false)?
    {
        output::info("Cancelled.");
        return Ok(());
    }

    rt.app.delete_entry(&rt.context(), key)?;
    output::success(&format!("Deleted entry '{key}' from '{}' vault", rt.env));

    Ok(())
}
