//! Error types for dc-template-linter.
//!
//! Validators never fail: they report findings. These errors cover the
//! things that stop a template from being checked at all (decode, I/O,
//! configuration) and are turned into Fatal findings by the run loop.

use std::path::PathBuf;

use thiserror::Error;

/// Library error type
#[derive(Debug, Error)]
pub enum LintError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("template decode failed: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("logo probe failed: {0}")]
    Probe(String),

    #[error("temporary file in {dir} failed: {message}")]
    TempFile { dir: PathBuf, message: String },

    #[error("write to {path} failed: {message}")]
    Write { path: PathBuf, message: String },

    #[error("rename of {from} to {to} failed: {message}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LintError>;
