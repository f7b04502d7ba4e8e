//! Persistence of vaults, one JSON file per environment.

use std::io;
use std::path::{Path, PathBuf};

use super::format;
use super::model::Vault;
use crate::context::VaultContext;
use crate::errors::{LockifyError, Result};
use crate::storage::{FileSystem, DIR_MODE, FILE_MODE};

/// Load and store vaults by environment name.
pub trait VaultRepository: Send + Sync {
    /// Whether a vault file exists for `vctx.env`. I/O failures other than
    /// "not found" are errors, not `false`.
    fn exists(&self, vctx: &VaultContext) -> Result<bool>;

    fn load(&self, vctx: &VaultContext) -> Result<Vault>;

    /// Write the vault, replacing any previous file atomically.
    fn save(&self, vctx: &VaultContext, vault: &mut Vault) -> Result<()>;

    /// Persist a brand-new vault. Fails if one already exists.
    fn create(&self, vctx: &VaultContext, vault: &mut Vault) -> Result<()>;
}

/// `VaultRepository` storing `<base_dir>/<env>.vault.enc` through a `FileSystem`.
pub struct FileVaultRepository<F: FileSystem> {
    fs: F,
    base_dir: PathBuf,
}

impl<F: FileSystem> FileVaultRepository<F> {
    pub fn new(fs: F, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the vault file for `env`.
    pub fn vault_path(&self, env: &str) -> PathBuf {
        self.base_dir.join(format!("{env}.vault.enc"))
    }
}

impl<F: FileSystem> VaultRepository for FileVaultRepository<F> {
    fn exists(&self, vctx: &VaultContext) -> Result<bool> {
        vctx.check()?;
        let path = self.vault_path(&vctx.env);

        match self.fs.stat(&path) {
            Ok(info) if info.is_dir => Err(LockifyError::Storage(format!(
                "{} is a directory",
                path.display()
            ))),
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(LockifyError::Storage(format!(
                "failed to check {}: {e}",
                path.display()
            ))),
        }
    }

    fn load(&self, vctx: &VaultContext) -> Result<Vault> {
        vctx.check()?;
        let path = self.vault_path(&vctx.env);

        let bytes = self.fs.read_file(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                LockifyError::VaultNotFound(vctx.env.clone())
            } else {
                LockifyError::Storage(format!("failed to read {}: {e}", path.display()))
            }
        })?;

        let mut vault = format::decode(&bytes)
            .map_err(|e| e.context(format!("{}", path.display())))?;

        if vault.env() != vctx.env {
            return Err(LockifyError::Validation(format!(
                "{} belongs to environment '{}', expected '{}'",
                path.display(),
                vault.env(),
                vctx.env
            )));
        }

        vault.set_path(&path);
        tracing::debug!(env = %vctx.env, entries = vault.entries_count(), "vault loaded");
        Ok(vault)
    }

    fn save(&self, vctx: &VaultContext, vault: &mut Vault) -> Result<()> {
        vctx.check()?;
        if vault.env() != vctx.env {
            return Err(LockifyError::Validation(format!(
                "cannot save vault for '{}' as '{}'",
                vault.env(),
                vctx.env
            )));
        }

        let path = self.vault_path(&vctx.env);
        let bytes = format::encode(vault)?;

        self.fs
            .write_file(&path, &bytes, FILE_MODE)
            .map_err(|e| LockifyError::Storage(format!("failed to write {}: {e}", path.display())))?;

        vault.set_path(&path);
        tracing::debug!(env = %vctx.env, entries = vault.entries_count(), "vault saved");
        Ok(())
    }

    fn create(&self, vctx: &VaultContext, vault: &mut Vault) -> Result<()> {
        if self.exists(vctx)? {
            return Err(LockifyError::VaultAlreadyExists(vctx.env.clone()));
        }

        self.fs.mkdir_all(&self.base_dir, DIR_MODE).map_err(|e| {
            LockifyError::Storage(format!(
                "failed to create {}: {e}",
                self.base_dir.display()
            ))
        })?;

        self.save(vctx, vault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::OsFileSystem;
    use tempfile::TempDir;

    fn repo(dir: &TempDir) -> FileVaultRepository<OsFileSystem> {
        FileVaultRepository::new(OsFileSystem, dir.path().join(".lockify"))
    }

    #[test]
    fn create_then_load() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        let vctx = VaultContext::new("dev", false);

        assert!(!repo.exists(&vctx).unwrap());

        let mut vault = Vault::new("dev", "fp", "c2FsdA==").unwrap();
        vault.set_entry("A", "YQ==".into()).unwrap();
        repo.create(&vctx, &mut vault).unwrap();

        assert!(repo.exists(&vctx).unwrap());
        assert_eq!(vault.path(), Some(repo.vault_path("dev").as_path()));

        let loaded = repo.load(&vctx).unwrap();
        assert_eq!(loaded.meta(), vault.meta());
        assert_eq!(loaded.entries(), vault.entries());
        assert!(loaded.passphrase().is_none());
    }

    #[test]
    fn create_twice_fails_with_exists() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        let vctx = VaultContext::new("dev", false);

        let mut vault = Vault::new("dev", "fp", "c2FsdA==").unwrap();
        repo.create(&vctx, &mut vault).unwrap();

        let err = repo.create(&vctx, &mut vault).unwrap_err();
        assert!(matches!(err, LockifyError::VaultAlreadyExists(_)));
    }

    #[test]
    fn load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = repo(&dir)
            .load(&VaultContext::new("ghost", false))
            .unwrap_err();
        assert!(matches!(err, LockifyError::VaultNotFound(_)));
    }

    #[test]
    fn load_rejects_misplaced_file() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        let mut vault = Vault::new("dev", "fp", "c2FsdA==").unwrap();
        repo.create(&VaultContext::new("dev", false), &mut vault)
            .unwrap();
        std::fs::copy(repo.vault_path("dev"), repo.vault_path("prod")).unwrap();

        let err = repo.load(&VaultContext::new("prod", false)).unwrap_err();
        assert!(matches!(err, LockifyError::Validation(_)));
    }

    #[test]
    fn load_rejects_corrupt_json() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        std::fs::create_dir_all(repo.base_dir()).unwrap();
        std::fs::write(repo.vault_path("dev"), b"garbage").unwrap();

        let err = repo.load(&VaultContext::new("dev", false)).unwrap_err();
        assert!(matches!(err, LockifyError::InvalidVaultFormat(_)));
    }

    #[test]
    fn exists_on_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        std::fs::create_dir_all(repo.vault_path("dev")).unwrap();

        assert!(repo.exists(&VaultContext::new("dev", false)).is_err());
    }
}
