//! `lockify get` — print a single decrypted value.

use crate::cli::Runtime;
use crate::errors::Result;

/// Execute the `get` command.
///
/// Prints only the raw value to stdout so it can be used in pipes
/// and command substitution: `export DB=$(lockify get DB_URL)`.
pub fn execute(rt: &Runtime, key: &str) -> Result<()> {
    let value = rt.app.get_entry(&rt.context(), key)?;
    println!("{}", value.as_str());
    Ok(())
}
