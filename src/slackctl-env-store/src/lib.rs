//! Env-file credential storage for slackctl.
//!
//! This crate persists string values under string keys in a flat
//! `KEY=VALUE` text file (conventionally `.env`):
//! - Upsert by key, replacing the first matching entry in place
//! - Comment lines are never matched, even when they contain `KEY=`
//! - Unrelated lines keep their content and order
//!
//! The whole file is rewritten on every update. There is no locking, so
//! callers must ensure a single writer per file.

pub mod grammar;
mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use grammar::{EnvDocument, EnvLine, LINE_SEPARATOR};
pub use store::{CredentialStore, EnvFile, MemoryStore};

/// Default env file name, relative to the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Errors that can occur during env store operations.
#[derive(Error, Debug)]
pub enum EnvStoreError {
    /// The env file does not exist. It is never created implicitly.
    #[error("Env file not found: {}", path.display())]
    NotFound {
        /// Path of the missing file.
        path: PathBuf,
    },

    /// The env file exists but could not be read.
    #[error("Failed to read env file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The env file could not be written.
    #[error("Failed to write env file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key or value cannot be represented as a single `KEY=VALUE` line.
    #[error("Invalid env entry for key '{key}': {reason}")]
    InvalidEntry { key: String, reason: String },
}

/// Result type for env store operations.
pub type Result<T> = std::result::Result<T, EnvStoreError>;

/// Check that `key` and `value` form a single parseable entry line.
pub fn validate_entry(key: &str, value: &str) -> Result<()> {
    let invalid = |reason: &str| EnvStoreError::InvalidEntry {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.contains('=') {
        return Err(invalid("key contains '='"));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(invalid("key contains whitespace"));
    }
    if key.starts_with('#') {
        return Err(invalid("key starts with a comment marker"));
    }
    if value.contains(['\n', '\r']) {
        return Err(invalid("value contains a line break"));
    }
    Ok(())
}
