//! Cryptographic primitives for Lockify.
//!
//! This module provides:
//! - AES-256-GCM entry encryption keyed by passphrase + salt (`encryption`)
//! - Argon2id key derivation (`kdf`)
//! - Passphrase fingerprints and salt generation (`hash`)
//! - The self-wiping `Passphrase` buffer (`secret`)

pub mod encryption;
pub mod hash;
pub mod kdf;
pub mod secret;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{AesGcmEncryption, EncryptionService, Passphrase, ...};
pub use encryption::{AesGcmEncryption, EncryptionService};
pub use hash::{HashService, PhcHashService, DEFAULT_SALT_SIZE};
pub use kdf::{derive_key, Argon2Params};
pub use secret::Passphrase;
