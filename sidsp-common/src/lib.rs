//! # SIDSP Common Library
//!
//! Shared code for the SIDSP application presence tooling:
//! - Error and result types
//! - Configuration loading (TOML file, environment, defaults)
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod time;

pub use config::{LoggingConfig, Settings, SettingsOverrides, TomlConfig};
pub use error::{Error, Result};
