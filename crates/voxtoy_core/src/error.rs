//! # Core Error Types
//!
//! The simulation itself never fails; only configuration and model
//! ingestion can.

use std::path::PathBuf;

use thiserror::Error;
use voxtoy_shared::ImportError;

/// Errors from loading or validating an [`EngineConfig`](crate::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// TOML syntax or type mismatch.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A value is outside its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors surfaced by engine entry points that take external input.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Model text could not be turned into cubes.
    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
