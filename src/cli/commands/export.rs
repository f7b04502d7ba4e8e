//! `lockify export` — write decrypted entries as `.env` or JSON.

use std::path::Path;

use crate::cli::formats::FileFormat;
use crate::cli::{output, Runtime};
use crate::errors::{LockifyError, Result};
use crate::storage::{FileSystem, OsFileSystem, FILE_MODE};

/// Execute the `export` command.
pub fn execute(rt: &Runtime, format: FileFormat, output_path: Option<&Path>) -> Result<()> {
    let entries = rt.app.export_entries(&rt.context())?;
    let content = format.format(&entries)?;

    match output_path {
        Some(dest) => {
            // Refuse to overwrite vault files.
            if dest
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".vault.enc"))
            {
                return Err(LockifyError::CommandFailed(
                    "refusing to export over a vault file".into(),
                ));
            }

            OsFileSystem
                .write_file(dest, content.as_bytes(), FILE_MODE)
                .map_err(|e| {
                    LockifyError::Storage(format!("failed to write {}: {e}", dest.display()))
                })?;

            output::success(&format!(
                "Exported {} entries to {}",
                entries.len(),
                dest.display()
            ));
        }
        None => {
            // Raw output only, so it can be redirected.
            print!("{}", content.as_str());
            if format == FileFormat::Json {
                println!();
            }
        }
    }

    Ok(())
}
