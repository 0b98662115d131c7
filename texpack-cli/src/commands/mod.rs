//! CLI subcommands.

pub mod common;
pub mod init;
pub mod preload;
pub mod scan;

pub use common::resolve_user_root;
