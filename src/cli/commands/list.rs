//! `lockify list`: entry names and timestamps, never values.

use crate::cli::{output, Runtime};
use crate::errors::Result;

pub fn execute(rt: &Runtime) -> Result<()> {
    let entries = rt.app.list_entries(&rt.context())?;

    if entries.is_empty() {
        output::info(&format!("No entries in the '{}' vault yet.", rt.env));
        output::tip("Run `lockify add <KEY>` to add your first entry.");
        return Ok(());
    }

    println!("{}", output::entries_table(&rt.env, &entries));
    Ok(())
}
