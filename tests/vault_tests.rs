//! Integration tests for the `Vault` entity and its rotation protocol.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::sleep;
use std::time::Duration;

use zeroize::Zeroizing;

use lockify::crypto::{
    AesGcmEncryption, Argon2Params, EncryptionService, HashService, Passphrase, PhcHashService,
};
use lockify::errors::{LockifyError, Result};
use lockify::vault::Vault;

fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

fn encryption() -> AesGcmEncryption {
    AesGcmEncryption::new(fast_params())
}

fn hasher() -> PhcHashService {
    PhcHashService::new(fast_params())
}

/// Helper: an unlocked vault holding `entries` encrypted under `pass`.
fn vault_with(pass: &str, entries: &[(&str, &str)]) -> Vault {
    let h = hasher();
    let enc = encryption();
    let passphrase = Passphrase::new(pass);

    let mut vault = Vault::new(
        "dev",
        h.hash(&passphrase).unwrap(),
        h.generate_salt(16).unwrap(),
    )
    .unwrap();
    vault.set_passphrase(&passphrase, &h).unwrap();

    for (key, value) in entries {
        let ct = enc.encrypt(value.as_bytes(), vault.salt(), &passphrase).unwrap();
        vault.set_entry(key, ct).unwrap();
    }
    vault
}

fn decrypt(vault: &Vault, key: &str, pass: &str) -> String {
    let entry = vault.get_entry(key).unwrap();
    let pt = encryption()
        .decrypt(&entry.value, vault.salt(), &Passphrase::new(pass))
        .unwrap();
    String::from_utf8(pt.to_vec()).unwrap()
}

/// Delegates to the real service but fails the `fail_on`-th encrypt call.
struct FailingEncryption {
    inner: AesGcmEncryption,
    fail_on: usize,
    calls: AtomicUsize,
}

impl FailingEncryption {
    fn new(fail_on: usize) -> Self {
        Self {
            inner: encryption(),
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }
}

impl EncryptionService for FailingEncryption {
    fn encrypt(&self, plaintext: &[u8], salt: &str, passphrase: &Passphrase) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_on {
            return Err(LockifyError::EncryptionFailed("injected failure".into()));
        }
        self.inner.encrypt(plaintext, salt, passphrase)
    }

    fn decrypt(
        &self,
        ciphertext: &str,
        salt: &str,
        passphrase: &Passphrase,
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.inner.decrypt(ciphertext, salt, passphrase)
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[test]
fn upsert_keeps_created_at_and_advances_updated_at() {
    let mut vault = vault_with("p", &[]);

    vault.set_entry("K", "djE=".into()).unwrap();
    let first = vault.get_entry("K").unwrap().clone();

    sleep(Duration::from_millis(10));
    vault.set_entry("K", "djI=".into()).unwrap();
    let second = vault.get_entry("K").unwrap();

    assert_eq!(second.value, "djI=");
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at > first.updated_at);
}

#[test]
fn set_passphrase_requires_matching_fingerprint() {
    let mut vault = vault_with("right", &[]);
    vault.clear_passphrase();

    let err = vault
        .set_passphrase(&Passphrase::new("wrong"), &hasher())
        .unwrap_err();
    assert!(matches!(err, LockifyError::AuthenticationFailed(_)));
    assert!(vault.passphrase().is_none());

    vault
        .set_passphrase(&Passphrase::new("right"), &hasher())
        .unwrap();
    assert_eq!(vault.passphrase().unwrap().expose(), "right");
}

#[test]
fn metadata_listing_has_no_ciphertext() {
    let vault = vault_with("p", &[("B", "2"), ("A", "1")]);
    let listed = vault.list_entries();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "A");
    assert_eq!(listed[1].name, "B");
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

#[test]
fn rotation_reencrypts_every_entry() {
    let mut vault = vault_with(
        "old",
        &[("DB_URL", "postgres://x"), ("API_KEY", "k-123"), ("EMPTY", "")],
    );
    let old_salt = vault.salt().to_string();
    let old_fp = vault.fingerprint().to_string();
    let created = vault.get_entry("DB_URL").unwrap().created_at;

    vault
        .rotate_passphrase(
            &Passphrase::new("old"),
            &Passphrase::new("new"),
            &encryption(),
            &hasher(),
            16,
        )
        .unwrap();

    assert_ne!(vault.salt(), old_salt);
    assert_ne!(vault.fingerprint(), old_fp);
    assert!(hasher()
        .verify(vault.fingerprint(), &Passphrase::new("new"))
        .is_ok());
    assert_eq!(vault.passphrase().unwrap().expose(), "new");

    assert_eq!(decrypt(&vault, "DB_URL", "new"), "postgres://x");
    assert_eq!(decrypt(&vault, "API_KEY", "new"), "k-123");
    assert_eq!(decrypt(&vault, "EMPTY", "new"), "");
    assert_eq!(vault.get_entry("DB_URL").unwrap().created_at, created);

    // The old key no longer opens anything.
    let entry = vault.get_entry("DB_URL").unwrap();
    assert!(encryption()
        .decrypt(&entry.value, vault.salt(), &Passphrase::new("old"))
        .is_err());
}

#[test]
fn rotation_of_empty_vault_changes_meta() {
    let mut vault = vault_with("old", &[]);
    let old_salt = vault.salt().to_string();

    vault
        .rotate_passphrase(
            &Passphrase::new("old"),
            &Passphrase::new("new"),
            &encryption(),
            &hasher(),
            0,
        )
        .unwrap();

    assert_ne!(vault.salt(), old_salt);
    assert!(hasher()
        .verify(vault.fingerprint(), &Passphrase::new("new"))
        .is_ok());
}

#[test]
fn rotation_with_wrong_current_passphrase_changes_nothing() {
    let mut vault = vault_with("old", &[("A", "1")]);
    let before = vault.clone();

    let err = vault
        .rotate_passphrase(
            &Passphrase::new("not-old"),
            &Passphrase::new("new"),
            &encryption(),
            &hasher(),
            16,
        )
        .unwrap_err();

    assert!(matches!(err, LockifyError::AuthenticationFailed(_)));
    assert_eq!(vault.meta(), before.meta());
    assert_eq!(vault.entries(), before.entries());
}

#[test]
fn rotation_failure_midway_leaves_vault_untouched() {
    let mut vault = vault_with("old", &[("A", "1"), ("B", "2"), ("C", "3")]);
    let before = vault.clone();

    // Fails while re-encrypting the second entry.
    let failing = FailingEncryption::new(2);
    let err = vault
        .rotate_passphrase(
            &Passphrase::new("old"),
            &Passphrase::new("new"),
            &failing,
            &hasher(),
            16,
        )
        .unwrap_err();

    assert!(matches!(err, LockifyError::EncryptionFailed(_)));
    assert_eq!(vault.meta(), before.meta());
    assert_eq!(vault.entries(), before.entries());
    assert_eq!(vault.passphrase().unwrap().expose(), "old");

    // Everything still opens with the old passphrase.
    assert_eq!(decrypt(&vault, "A", "old"), "1");
    assert_eq!(decrypt(&vault, "C", "old"), "3");
}

#[test]
fn rotation_stops_on_undecryptable_entry() {
    let mut vault = vault_with("old", &[("A", "1")]);
    // Ciphertext sealed under a different passphrase.
    let foreign = encryption()
        .encrypt(b"x", vault.salt(), &Passphrase::new("other"))
        .unwrap();
    vault.set_entry("B", foreign).unwrap();
    let before = vault.clone();

    let err = vault
        .rotate_passphrase(
            &Passphrase::new("old"),
            &Passphrase::new("new"),
            &encryption(),
            &hasher(),
            16,
        )
        .unwrap_err();

    assert!(matches!(err, LockifyError::AuthenticationFailed(_)));
    assert!(err.to_string().contains("'B'"));
    assert_eq!(vault.meta(), before.meta());
    assert_eq!(vault.entries(), before.entries());
}

#[test]
fn rotation_rejects_empty_new_passphrase() {
    let mut vault = vault_with("old", &[("A", "1")]);
    let err = vault
        .rotate_passphrase(
            &Passphrase::new("old"),
            &Passphrase::default(),
            &encryption(),
            &hasher(),
            16,
        )
        .unwrap_err();
    assert!(matches!(err, LockifyError::Validation(_)));
}
