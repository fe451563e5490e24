// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WindError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to scan files: {0}")]
    ScanError(String),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Failed to start application: {0}")]
    LaunchFailed(String),

    #[error("Failed to create output directory: {0}")]
    OutputDirError(String),

    #[error("Signal handling error: {0}")]
    SignalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WindError>;
