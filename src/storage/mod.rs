//! Filesystem access used by the vault repository.
//!
//! The repository only needs four calls, so they sit behind a small trait
//! that tests can replace with an in-memory double.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Owner-only directory access.
pub const DIR_MODE: u32 = 0o700;

/// Owner-only read/write.
pub const FILE_MODE: u32 = 0o600;

/// What `stat` reports about a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub is_dir: bool,
    /// Permission bits (always 0 on non-unix platforms).
    pub mode: u32,
}

/// Byte-oriented store the vault repository persists through.
pub trait FileSystem: Send + Sync {
    /// Create `path` and any missing parents with `mode`.
    fn mkdir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Replace the contents of `path` with `data`. Implementations must not
    /// truncate the existing file before the new contents are complete.
    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()>;

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Fails with `io::ErrorKind::NotFound` when the path does not exist.
    fn stat(&self, path: &Path) -> io::Result<FileInfo>;
}

/// `FileSystem` on the real disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn mkdir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        builder.create(path)
    }

    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
        // The temp file lives next to the target so the rename stays on
        // one filesystem and is atomic.
        let parent = path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        let result = (|| {
            let mut file = options.open(&tmp_path)?;
            file.write_all(data)?;
            file.sync_all()?;

            // A pre-existing temp file keeps its old mode; force it.
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&tmp_path, fs::Permissions::from_mode(mode))?;
            }

            fs::rename(&tmp_path, path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        let meta = fs::metadata(path)?;

        #[cfg(unix)]
        let mode = {
            use std::os::unix::fs::PermissionsExt;
            meta.permissions().mode() & 0o777
        };
        #[cfg(not(unix))]
        let mode = 0;

        Ok(FileInfo {
            is_dir: meta.is_dir(),
            mode,
        })
    }
}
