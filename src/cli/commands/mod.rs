//! One module per subcommand.

pub mod add;
pub mod cache;
pub mod delete;
pub mod export;
pub mod get;
pub mod import_cmd;
pub mod init;
pub mod list;
pub mod rotate;
pub mod version;
