//! Vault module — the per-environment encrypted store.
//!
//! This module provides:
//! - `Entry`, `EntryMetadata` and `Meta` types (`entry`)
//! - The JSON file format (`format`)
//! - The `Vault` entity with the rotation protocol (`model`)
//! - File-backed persistence (`repository`)
//! - Create/open/save orchestration (`service`)

pub mod entry;
pub mod format;
pub mod model;
pub mod repository;
pub mod service;

// Re-export the most commonly used items.
pub use entry::{Entry, EntryMetadata, Meta};
pub use model::Vault;
pub use repository::{FileVaultRepository, VaultRepository};
pub use service::VaultService;
