//! Error types for the API test runner
//!
//! Only configuration problems are errors. Anything that goes wrong while a
//! test is executing is recorded as a failed test instead.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the API test runner
#[derive(Error, Debug)]
pub enum Error {
    // === Test Construction Errors ===
    #[error("[Test {test}] Missing URL")]
    MissingUrl { test: String },

    #[error("[Test {test}] Missing expected result file")]
    MissingExpectedFile { test: String },

    #[error("[Test {test}] Could not find expected result file: \"{path}\"")]
    ExpectedFileNotFound { test: String, path: String },

    // === Suite Construction Errors ===
    #[error("Non-valid baseUrl: '{0}'")]
    InvalidBaseUrl(String),

    // === Configuration Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === Transport Errors ===
    #[error("HTTP request failed: {0}")]
    Http(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a file read error for the given path
    pub fn file_read(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Whether this error was raised while building a suite or one of its tests
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Error::MissingUrl { .. }
                | Error::MissingExpectedFile { .. }
                | Error::ExpectedFileNotFound { .. }
                | Error::InvalidBaseUrl(_)
        )
    }
}
