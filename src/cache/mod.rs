//! Credential caching for resolved passphrases.
//!
//! With the `keyring-store` feature, passphrases are kept in the operating
//! system's secure credential store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! Without it, `NullCache` is used: nothing is ever remembered and the
//! passphrase resolver falls back to the override or a prompt.

use crate::crypto::Passphrase;
use crate::errors::{LockifyError, Result};

/// Cache key for an environment's passphrase.
pub fn cache_key(env: &str) -> String {
    format!("env:{env}")
}

/// Secure key/value store for passphrases.
pub trait CredentialCache: Send + Sync {
    fn set(&self, key: &str, secret: &Passphrase) -> Result<()>;

    /// `Ok(None)` when nothing is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Passphrase>>;

    /// Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// Remove everything this cache stored.
    fn delete_all(&self) -> Result<()>;
}

// ── NullCache ───────────────────────────────────────────────────────

/// Cache that never remembers anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl CredentialCache for NullCache {
    fn set(&self, _key: &str, _secret: &Passphrase) -> Result<()> {
        Err(LockifyError::KeyringError(
            "credential caching is not available in this build (enable the `keyring-store` feature)"
                .into(),
        ))
    }

    fn get(&self, _key: &str) -> Result<Option<Passphrase>> {
        Ok(None)
    }

    fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        Ok(())
    }
}

// ── MemoryCache ─────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) use self::memory::MemoryCache;

#[cfg(test)]
mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::CredentialCache;
    use crate::crypto::Passphrase;
    use crate::errors::Result;

    /// In-process cache for unit tests.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryCache {
        entries: Mutex<HashMap<String, Passphrase>>,
    }

    impl MemoryCache {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn len(&self) -> usize {
            self.entries.lock().unwrap().len()
        }

        pub(crate) fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl CredentialCache for MemoryCache {
        fn set(&self, key: &str, secret: &Passphrase) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), secret.clone());
            Ok(())
        }

        fn get(&self, key: &str) -> Result<Option<Passphrase>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        fn delete(&self, key: &str) -> Result<()> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }

        fn delete_all(&self) -> Result<()> {
            self.entries.lock().unwrap().clear();
            Ok(())
        }
    }
}

// ── KeyringCache ────────────────────────────────────────────────────

#[cfg(feature = "keyring-store")]
pub use self::os::KeyringCache;

#[cfg(feature = "keyring-store")]
mod os {
    use super::CredentialCache;
    use crate::crypto::Passphrase;
    use crate::errors::{LockifyError, Result};

    /// Credential holding the newline-separated list of keys we stored,
    /// so `delete_all` can find them again.
    const INDEX_KEY: &str = "__lockify_index__";

    /// `CredentialCache` on the OS keyring, under one service namespace.
    #[derive(Debug, Clone)]
    pub struct KeyringCache {
        service: String,
    }

    impl KeyringCache {
        pub fn new(service: impl Into<String>) -> Self {
            Self {
                service: service.into(),
            }
        }

        fn entry(&self, key: &str) -> Result<keyring::Entry> {
            keyring::Entry::new(&self.service, key).map_err(|e| {
                LockifyError::KeyringError(format!("failed to create keyring entry: {e}"))
            })
        }

        fn read_index(&self) -> Result<Vec<String>> {
            match self.entry(INDEX_KEY)?.get_password() {
                Ok(raw) => Ok(raw
                    .lines()
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect()),
                Err(keyring::Error::NoEntry) => Ok(Vec::new()),
                Err(e) => Err(LockifyError::KeyringError(format!(
                    "failed to read keyring index: {e}"
                ))),
            }
        }

        fn write_index(&self, keys: &[String]) -> Result<()> {
            let entry = self.entry(INDEX_KEY)?;
            let result = if keys.is_empty() {
                match entry.delete_credential() {
                    Err(keyring::Error::NoEntry) => Ok(()),
                    other => other,
                }
            } else {
                entry.set_password(&keys.join("\n"))
            };
            result.map_err(|e| {
                LockifyError::KeyringError(format!("failed to update keyring index: {e}"))
            })
        }
    }

    impl CredentialCache for KeyringCache {
        fn set(&self, key: &str, secret: &Passphrase) -> Result<()> {
            self.entry(key)?.set_password(secret.expose()).map_err(|e| {
                LockifyError::KeyringError(format!("failed to store passphrase in keyring: {e}"))
            })?;

            let mut index = self.read_index()?;
            if !index.iter().any(|k| k == key) {
                index.push(key.to_string());
                self.write_index(&index)?;
            }
            Ok(())
        }

        fn get(&self, key: &str) -> Result<Option<Passphrase>> {
            match self.entry(key)?.get_password() {
                Ok(secret) => Ok(Some(Passphrase::new(secret))),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(LockifyError::KeyringError(format!(
                    "failed to read from keyring: {e}"
                ))),
            }
        }

        fn delete(&self, key: &str) -> Result<()> {
            match self.entry(key)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => {
                    return Err(LockifyError::KeyringError(format!(
                        "failed to delete from keyring: {e}"
                    )))
                }
            }

            let mut index = self.read_index()?;
            let before = index.len();
            index.retain(|k| k != key);
            if index.len() != before {
                self.write_index(&index)?;
            }
            Ok(())
        }

        fn delete_all(&self) -> Result<()> {
            let index = self.read_index()?;
            let mut failed = Vec::new();

            for key in &index {
                match self.entry(key)?.delete_credential() {
                    Ok(()) | Err(keyring::Error::NoEntry) => {}
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "failed to delete keyring entry");
                        failed.push(key.clone());
                    }
                }
            }

            self.write_index(&failed)?;
            if failed.is_empty() {
                Ok(())
            } else {
                Err(LockifyError::KeyringError(format!(
                    "failed to delete {} keyring entries",
                    failed.len()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_format() {
        assert_eq!(cache_key("prod"), "env:prod");
    }

    #[test]
    fn null_cache_never_returns_values() {
        let cache = NullCache;
        assert!(cache.set("env:dev", &Passphrase::new("p")).is_err());
        assert!(cache.get("env:dev").unwrap().is_none());
        assert!(cache.delete("env:dev").is_ok());
        assert!(cache.delete_all().is_ok());
    }

    #[test]
    fn memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        cache.set("env:dev", &Passphrase::new("p1")).unwrap();
        cache.set("env:prod", &Passphrase::new("p2")).unwrap();

        assert_eq!(cache.get("env:dev").unwrap().unwrap().expose(), "p1");
        assert_eq!(cache.len(), 2);

        cache.delete("env:dev").unwrap();
        assert!(cache.get("env:dev").unwrap().is_none());
        cache.delete("env:dev").unwrap();

        cache.delete_all().unwrap();
        assert!(cache.is_empty());
    }
}
