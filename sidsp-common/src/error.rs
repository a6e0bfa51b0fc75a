//! Common error types for SIDSP tooling

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for SIDSP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the SIDSP crates
#[derive(Error, Debug)]
pub enum Error {
    /// A file that exists could not be read
    #[error("Read failed ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
