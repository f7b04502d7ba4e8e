//! Integration tests for the Lockify crypto module.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use lockify::crypto::{
    AesGcmEncryption, Argon2Params, EncryptionService, HashService, Passphrase, PhcHashService,
};
use lockify::errors::{ErrorKind, LockifyError};

/// Cheap parameters so the suite stays fast.
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

fn salt() -> String {
    hasher().generate_salt(16).unwrap()
}

// ---------------------------------------------------------------------------
// Encryption
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_various_plaintexts() {
    let enc = encryption();
    let salt = salt();
    let pass = Passphrase::new("p@ss");

    let long = vec![0xAB; 4096];
    let cases: [&[u8]; 5] = [b"", b"x", b"postgres://x", "h\u{e9}llo \u{1f512}".as_bytes(), &long];

    for plaintext in cases {
        let ct = enc.encrypt(plaintext, &salt, &pass).unwrap();
        let pt = enc.decrypt(&ct, &salt, &pass).unwrap();
        assert_eq!(pt.as_slice(), plaintext);
    }
}

#[test]
fn same_input_encrypts_differently() {
    let enc = encryption();
    let salt = salt();
    let pass = Passphrase::new("p@ss");

    let a = enc.encrypt(b"same", &salt, &pass).unwrap();
    let b = enc.encrypt(b"same", &salt, &pass).unwrap();
    assert_ne!(a, b);

    assert_eq!(enc.decrypt(&a, &salt, &pass).unwrap().as_slice(), b"same");
    assert_eq!(enc.decrypt(&b, &salt, &pass).unwrap().as_slice(), b"same");
}

#[test]
fn flipping_any_byte_is_detected() {
    let enc = encryption();
    let salt = salt();
    let pass = Passphrase::new("p@ss");

    let ct = enc.encrypt(b"secret", &salt, &pass).unwrap();
    let raw = BASE64.decode(&ct).unwrap();

    for i in 0..raw.len() {
        let mut tampered = raw.clone();
        tampered[i] ^= 0x01;
        let err = enc
            .decrypt(&BASE64.encode(&tampered), &salt, &pass)
            .unwrap_err();
        assert!(
            matches!(err, LockifyError::AuthenticationFailed(_)),
            "byte {i}: expected authentication failure, got {err:?}"
        );
    }
}

#[test]
fn wrong_passphrase_or_salt_is_rejected() {
    let enc = encryption();
    let salt = salt();
    let pass = Passphrase::new("right");
    let ct = enc.encrypt(b"secret", &salt, &pass).unwrap();

    let err = enc
        .decrypt(&ct, &salt, &Passphrase::new("wrong"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);

    let other_salt = self::salt();
    let err = enc.decrypt(&ct, &other_salt, &pass).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn error_text_does_not_leak_secrets() {
    let enc = encryption();
    let salt = salt();
    let ct = enc
        .encrypt(b"top-secret-value", &salt, &Passphrase::new("hunter2"))
        .unwrap();

    let err = enc
        .decrypt(&ct, &salt, &Passphrase::new("guess"))
        .unwrap_err()
        .to_string();
    assert!(!err.contains("top-secret-value"));
    assert!(!err.contains("hunter2"));
    assert!(!err.contains("guess"));
}

#[test]
fn derivation_depends_on_params() {
    let salt = salt();
    let pass = Passphrase::new("p");
    let ct = encryption().encrypt(b"v", &salt, &pass).unwrap();

    let other = AesGcmEncryption::new(Argon2Params {
        memory_kib: 8_192,
        iterations: 2,
        parallelism: 1,
    });
    assert!(other.decrypt(&ct, &salt, &pass).is_err());
}

// ---------------------------------------------------------------------------
// Fingerprints
// ---------------------------------------------------------------------------

#[test]
fn fingerprint_verifies_only_its_passphrase() {
    let h = hasher();
    let fp = h.hash(&Passphrase::new("p")).unwrap();

    assert!(h.verify(&fp, &Passphrase::new("p")).is_ok());
    let err = h.verify(&fp, &Passphrase::new("p2")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn fingerprints_are_salted() {
    let h = hasher();
    let a = h.hash(&Passphrase::new("p")).unwrap();
    let b = h.hash(&Passphrase::new("p")).unwrap();

    assert_ne!(a, b);
    assert!(h.verify(&a, &Passphrase::new("p")).is_ok());
    assert!(h.verify(&b, &Passphrase::new("p")).is_ok());
}

#[test]
fn fingerprint_does_not_contain_passphrase() {
    let fp = hasher().hash(&Passphrase::new("correct-horse")).unwrap();
    assert!(!fp.contains("correct-horse"));
    assert!(fp.starts_with("$argon2id$"));
}

#[test]
fn verify_uses_cost_from_fingerprint() {
    // A fingerprint made with different costs still verifies.
    let fp = PhcHashService::new(Argon2Params {
        memory_kib: 9_000,
        iterations: 2,
        parallelism: 1,
    })
    .hash(&Passphrase::new("p"))
    .unwrap();

    assert!(hasher().verify(&fp, &Passphrase::new("p")).is_ok());
}
