pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod crypto;
pub mod environment;
pub mod errors;
pub mod passphrase;
pub mod prompt;
pub mod storage;
pub mod vault;
