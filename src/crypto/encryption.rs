//! AES-256-GCM authenticated encryption keyed by passphrase + salt.
//!
//! Each call to `encrypt` derives the key with Argon2id, generates a
//! fresh random 12-byte nonce and prepends it to the sealed bytes.
//! `decrypt` splits the nonce back out before opening.
//!
//! Layout of the base64-decoded ciphertext:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::{Zeroize, Zeroizing};

use super::kdf::{derive_key, Argon2Params};
use super::secret::Passphrase;
use crate::errors::{LockifyError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Symmetric authenticated encryption of entry values.
pub trait EncryptionService: Send + Sync {
    /// Seal `plaintext` and return `base64(nonce || ciphertext || tag)`.
    fn encrypt(&self, plaintext: &[u8], encoded_salt: &str, passphrase: &Passphrase)
        -> Result<String>;

    /// Open a value produced by `encrypt`. A wrong key or tampered data
    /// yields `AuthenticationFailed`, malformed input `Validation`.
    fn decrypt(
        &self,
        ciphertext: &str,
        encoded_salt: &str,
        passphrase: &Passphrase,
    ) -> Result<Zeroizing<Vec<u8>>>;
}

/// `EncryptionService` backed by Argon2id + AES-256-GCM.
#[derive(Debug, Clone, Default)]
pub struct AesGcmEncryption {
    params: Argon2Params,
}

impl AesGcmEncryption {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }

    /// Decode the salt and derive a cipher; the derived key never outlives this call.
    fn cipher(&self, encoded_salt: &str, passphrase: &Passphrase) -> Result<Aes256Gcm> {
        let mut salt = BASE64
            .decode(encoded_salt)
            .map_err(|e| LockifyError::Validation(format!("invalid salt encoding: {e}")))?;
        if salt.is_empty() {
            return Err(LockifyError::Validation("salt cannot be empty".into()));
        }

        let key = derive_key(passphrase.as_bytes(), &salt, &self.params);
        salt.zeroize();
        let key = key?;

        Aes256Gcm::new_from_slice(&key[..])
            .map_err(|e| LockifyError::EncryptionFailed(format!("invalid key length: {e}")))
    }
}

impl EncryptionService for AesGcmEncryption {
    fn encrypt(
        &self,
        plaintext: &[u8],
        encoded_salt: &str,
        passphrase: &Passphrase,
    ) -> Result<String> {
        if encoded_salt.is_empty() {
            return Err(LockifyError::EncryptionFailed("salt cannot be empty".into()));
        }
        if passphrase.is_empty() {
            return Err(LockifyError::EncryptionFailed(
                "passphrase cannot be empty".into(),
            ));
        }

        let cipher = self.cipher(encoded_salt, passphrase)?;

        // A fresh nonce per call; never reused under the same key.
        let mut nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let sealed = cipher.encrypt(&nonce, plaintext);
        let mut sealed = match sealed {
            Ok(bytes) => bytes,
            Err(e) => {
                nonce.as_mut_slice().zeroize();
                return Err(LockifyError::EncryptionFailed(format!(
                    "encryption error: {e}"
                )));
            }
        };

        let mut output = Vec::with_capacity(NONCE_LEN + sealed.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&sealed);
        let encoded = BASE64.encode(&output);

        nonce.as_mut_slice().zeroize();
        sealed.zeroize();
        output.zeroize();

        Ok(encoded)
    }

    fn decrypt(
        &self,
        ciphertext: &str,
        encoded_salt: &str,
        passphrase: &Passphrase,
    ) -> Result<Zeroizing<Vec<u8>>> {
        if ciphertext.is_empty() {
            return Err(LockifyError::Validation("ciphertext cannot be empty".into()));
        }
        if encoded_salt.is_empty() {
            return Err(LockifyError::Validation("salt cannot be empty".into()));
        }
        if passphrase.is_empty() {
            return Err(LockifyError::Validation("passphrase cannot be empty".into()));
        }

        let raw = Zeroizing::new(
            BASE64
                .decode(ciphertext)
                .map_err(|e| LockifyError::Validation(format!("invalid ciphertext encoding: {e}")))?,
        );

        let min_len = NONCE_LEN + TAG_LEN;
        if raw.len() < min_len {
            return Err(LockifyError::Validation(format!(
                "ciphertext too short: expected at least {min_len} bytes, got {}",
                raw.len()
            )));
        }

        let cipher = self.cipher(encoded_salt, passphrase)?;

        let (nonce_bytes, body) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = cipher.decrypt(nonce, body).map_err(|_| {
            LockifyError::AuthenticationFailed(
                "decryption failed — wrong passphrase or corrupted data".into(),
            )
        })?;

        Ok(Zeroizing::new(plaintext))
    }
}
