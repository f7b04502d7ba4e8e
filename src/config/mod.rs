//! Project configuration (`.lockify.toml`).

pub mod settings;

pub use settings::Settings;
