// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunhookError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A supervised command did not succeed and the server was told to
    /// surface that as a process-level failure.
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures that happen before the subprocess does any work.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("error getting stdout pipe")]
    StdoutPipe,

    #[error("error getting stderr pipe")]
    StderrPipe,

    #[error("error starting command: {0}")]
    Spawn(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RunhookError>;
