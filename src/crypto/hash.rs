//! Passphrase fingerprinting and salt generation.
//!
//! The fingerprint is a self-salting Argon2id PHC string: hashing the same
//! passphrase twice yields two different strings, and both verify. It is
//! used only to authenticate a supplied passphrase and is unrelated to the
//! vault salt that feeds key derivation.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Version};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;
use zeroize::Zeroize;

use super::kdf::Argon2Params;
use super::secret::Passphrase;
use crate::errors::{LockifyError, Result};

/// Salt size used when the caller passes 0.
pub const DEFAULT_SALT_SIZE: usize = 16;

/// One-way passphrase fingerprinting plus random salt generation.
pub trait HashService: Send + Sync {
    /// Fingerprint a passphrase. Fails on an empty passphrase.
    fn hash(&self, passphrase: &Passphrase) -> Result<String>;

    /// Succeeds only when `passphrase` produced `fingerprint`.
    fn verify(&self, fingerprint: &str, passphrase: &Passphrase) -> Result<()>;

    /// `n_bytes` of OS randomness, base64-encoded. 0 means `DEFAULT_SALT_SIZE`.
    fn generate_salt(&self, n_bytes: usize) -> Result<String>;
}

/// `HashService` producing Argon2id PHC-format fingerprints.
#[derive(Debug, Clone)]
pub struct PhcHashService {
    params: Argon2Params,
}

impl PhcHashService {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }
}

impl HashService for PhcHashService {
    fn hash(&self, passphrase: &Passphrase) -> Result<String> {
        if passphrase.is_empty() {
            return Err(LockifyError::Validation("passphrase cannot be empty".into()));
        }

        let argon2 = Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            self.params.to_argon2(None)?,
        );
        let mut raw_salt = [0u8; DEFAULT_SALT_SIZE];
        fill_random(&mut raw_salt)?;
        let salt = SaltString::encode_b64(&raw_salt)
            .map_err(|e| LockifyError::EncryptionFailed(format!("failed to encode salt: {e}")))?;

        argon2
            .hash_password(passphrase.as_bytes(), &salt)
            .map(|phc| phc.to_string())
            .map_err(|e| LockifyError::EncryptionFailed(format!("failed to generate hash: {e}")))
    }

    fn verify(&self, fingerprint: &str, passphrase: &Passphrase) -> Result<()> {
        if fingerprint.is_empty() {
            return Err(LockifyError::Validation("fingerprint cannot be empty".into()));
        }
        if fingerprint.starts_with("$2") {
            return Err(LockifyError::Validation(
                "bcrypt fingerprints are not supported; recreate the vault with lockify".into(),
            ));
        }

        let parsed = PasswordHash::new(fingerprint)
            .map_err(|e| LockifyError::Validation(format!("malformed fingerprint: {e}")))?;

        // Cost parameters come from the PHC string itself.
        Argon2::default()
            .verify_password(passphrase.as_bytes(), &parsed)
            .map_err(|e| match e {
                argon2::password_hash::Error::Password => {
                    LockifyError::AuthenticationFailed("invalid passphrase".into())
                }
                other => LockifyError::Validation(format!("cannot verify fingerprint: {other}")),
            })
    }

    fn generate_salt(&self, n_bytes: usize) -> Result<String> {
        let n = if n_bytes == 0 {
            DEFAULT_SALT_SIZE
        } else {
            n_bytes
        };

        let mut salt = vec![0u8; n];
        fill_random(&mut salt)?;

        let encoded = BASE64.encode(&salt);
        salt.zeroize();
        Ok(encoded)
    }
}

/// Fill `buf` from the operating system CSPRNG.
fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| LockifyError::EncryptionFailed(format!("failed to generate salt: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> PhcHashService {
        PhcHashService::new(Argon2Params {
            memory_kib: 8_192,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn empty_passphrase_cannot_be_hashed() {
        let err = service().hash(&Passphrase::default()).unwrap_err();
        assert!(matches!(err, LockifyError::Validation(_)));
    }

    #[test]
    fn empty_fingerprint_is_invalid() {
        let err = service().verify("", &Passphrase::new("p")).unwrap_err();
        assert!(matches!(err, LockifyError::Validation(_)));
    }

    #[test]
    fn garbage_fingerprint_is_invalid() {
        let err = service()
            .verify("not-a-phc-string", &Passphrase::new("p"))
            .unwrap_err();
        assert!(matches!(err, LockifyError::Validation(_)));
    }

    #[test]
    fn bcrypt_fingerprint_is_reported_as_unsupported() {
        let err = service()
            .verify(
                "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy",
                &Passphrase::new("p"),
            )
            .unwrap_err();
        assert!(matches!(err, LockifyError::Validation(ref m) if m.contains("bcrypt")));
    }

    #[test]
    fn salt_size_zero_defaults() {
        let salt = service().generate_salt(0).unwrap();
        assert_eq!(BASE64.decode(salt).unwrap().len(), DEFAULT_SALT_SIZE);
    }

    #[test]
    fn salt_size_is_respected() {
        let salt = service().generate_salt(32).unwrap();
        assert_eq!(BASE64.decode(salt).unwrap().len(), 32);
    }

    #[test]
    fn salts_are_random() {
        let svc = service();
        assert_ne!(svc.generate_salt(16).unwrap(), svc.generate_salt(16).unwrap());
    }
}
