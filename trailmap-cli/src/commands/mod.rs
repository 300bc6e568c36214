//! CLI command implementations.

pub mod common;
pub mod config;
pub mod info;
pub mod init;
pub mod preview;
pub mod run;
pub mod snapshot;
