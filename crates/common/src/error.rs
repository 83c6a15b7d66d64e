//! Error types for chatflow configuration and fixtures

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the common Error
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration and fixture errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("Unknown bot profile '{profile}' (known: {known})")]
    UnknownProfile { profile: String, known: String },

    #[error("Asset '{0}' is not defined in the fixture table")]
    UnknownAsset(String),

    #[error("Asset file not found at path: {}", .0.display())]
    AssetMissing(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
