//! Chatflow Common Library
//!
//! Configuration, errors and literal test data shared by the console E2E suite.

pub mod config;
pub mod error;
pub mod fixtures;

pub use config::{BotProfile, CleanupConfig, ConsoleConfig, Credentials, DeployConfig, TimeoutConfig};
pub use error::{Error, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file path, relative to the working directory
pub fn default_config_path() -> std::path::PathBuf {
    std::path::PathBuf::from("chatflow.toml")
}
