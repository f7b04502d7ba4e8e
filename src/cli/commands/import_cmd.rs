//! `lockify import` — import entries from a `.env` or JSON file.
//!
//! Reads stdin when no file is given. Existing keys are kept unless
//! `--overwrite` is passed.

use std::io::{self, Read};
use std::path::Path;

use zeroize::Zeroizing;

use crate::cli::formats::FileFormat;
use crate::cli::{output, Runtime};
use crate::errors::{LockifyError, Result};

/// Execute the `import` command.
pub fn execute(
    rt: &Runtime,
    file: Option<&Path>,
    format: Option<FileFormat>,
    overwrite: bool,
) -> Result<()> {
    let (content, source, detected) = match file {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                LockifyError::CommandFailed(format!(
                    "failed to read import file {}: {e}",
                    path.display()
                ))
            })?;
            (
                Zeroizing::new(content),
                path.display().to_string(),
                FileFormat::from_path(path),
            )
        }
        None => {
            let mut buf = Zeroizing::new(String::new());
            io::stdin().read_to_string(&mut buf)?;
            (buf, "stdin".to_string(), FileFormat::Dotenv)
        }
    };

    let entries = format.unwrap_or(detected).parse(&content)?;
    let summary = rt
        .app
        .import_entries(&rt.context(), &entries, overwrite)?;

    output::success(&format!(
        "Imported {} entries from {} into '{}' vault",
        summary.imported, source, rt.env
    ));
    if summary.skipped > 0 {
        output::warning(&format!(
            "Skipped {} existing entries (use --overwrite to replace them)",
            summary.skipped
        ));
    }

    Ok(())
}
