//! Error types for sidsp-checker
//!
//! Row resolution never produces these: every row ends in a
//! [`Verdict`](crate::resolver::Verdict). They cover setup and I/O around it.

use thiserror::Error;

/// Main error type for sidsp-checker
#[derive(Error, Debug)]
pub enum CheckerError {
    /// Input file missing, unsupported or lacking required columns
    #[error("Input error: {0}")]
    Input(String),

    /// Login failed or returned no usable token
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// HTTP client construction or request errors outside the transport
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV read/write errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet read errors
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// sidsp-common error
    #[error("Common error: {0}")]
    Common(#[from] sidsp_common::Error),
}

/// Convenience Result type using CheckerError
pub type CheckerResult<T> = std::result::Result<T, CheckerError>;
