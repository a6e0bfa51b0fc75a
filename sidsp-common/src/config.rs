//! Configuration loading and resolution
//!
//! Settings are resolved per key in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`SIDSP_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: a warning is logged and the remaining
//! tiers apply. A TOML file that exists but cannot be parsed is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ENV_BASE_URL: &str = "SIDSP_BASE_URL";
pub const ENV_TOKEN: &str = "SIDSP_TOKEN";
pub const ENV_AUTH_EMAIL: &str = "SIDSP_AUTH_EMAIL";
pub const ENV_AUTH_PASSWORD: &str = "SIDSP_AUTH_PASSWORD";
pub const ENV_TIMEOUT_SEC: &str = "SIDSP_TIMEOUT_SEC";
pub const ENV_CHECK_YEAR: &str = "SIDSP_CHECK_YEAR";
pub const ENV_EXCEL_HEADER_ROW: &str = "SIDSP_EXCEL_HEADER_ROW";
pub const ENV_RATE_LIMIT_MS: &str = "SIDSP_RATE_LIMIT_MS";

pub const DEFAULT_TIMEOUT_SEC: u64 = 20;
pub const DEFAULT_CHECK_YEAR: &str = "2025";
pub const DEFAULT_EXCEL_HEADER_ROW: usize = 0;
pub const DEFAULT_RATE_LIMIT_MS: u64 = 250; // 4 requests per second max

/// Configuration file as read from disk
///
/// Every field is optional; anything left out falls through to the
/// compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Base URL of the SIDSP API
    #[serde(default)]
    pub base_url: Option<String>,

    /// Pre-generated bearer token (skips login when present)
    #[serde(default)]
    pub token: Option<String>,

    /// Login email, used when no token is configured
    #[serde(default)]
    pub auth_email: Option<String>,

    /// Login password, used when no token is configured
    #[serde(default)]
    pub auth_password: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_sec: Option<u64>,

    /// Academic year checked when a row carries no usable year
    #[serde(default)]
    pub check_year: Option<String>,

    /// Header row index (0-based) for spreadsheet inputs
    #[serde(default)]
    pub excel_header_row: Option<usize>,

    /// Minimum spacing between API calls in milliseconds
    #[serde(default)]
    pub rate_limit_ms: Option<u64>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub base_url: Option<String>,
    pub check_year: Option<String>,
}

/// Fully resolved settings used by the checker
#[derive(Clone)]
pub struct Settings {
    pub base_url: String,
    pub token: Option<String>,
    pub auth_email: Option<String>,
    pub auth_password: Option<String>,
    pub timeout_sec: u64,
    pub check_year: String,
    pub excel_header_row: usize,
    pub rate_limit_ms: u64,
    pub logging: LoggingConfig,
}

// Credentials stay out of logs.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("auth_email", &self.auth_email)
            .field("auth_password", &self.auth_password.as_ref().map(|_| "<redacted>"))
            .field("timeout_sec", &self.timeout_sec)
            .field("check_year", &self.check_year)
            .field("excel_header_row", &self.excel_header_row)
            .field("rate_limit_ms", &self.rate_limit_ms)
            .field("logging", &self.logging)
            .finish()
    }
}

impl Settings {
    /// Resolve settings from CLI overrides, environment and TOML config
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no base URL is configured anywhere, or if a
    /// numeric setting does not parse.
    pub fn resolve(toml_config: &TomlConfig, overrides: &SettingsOverrides) -> Result<Self> {
        let base_url = pick(
            overrides.base_url.as_deref(),
            ENV_BASE_URL,
            toml_config.base_url.as_deref(),
        )
        .ok_or_else(|| {
            Error::Config(format!(
                "{} is not set. Configure it using one of:\n\
                 1. Command line: --base-url https://api.example.com\n\
                 2. Environment: {}=https://api.example.com\n\
                 3. TOML config: base_url = \"https://api.example.com\"",
                ENV_BASE_URL, ENV_BASE_URL
            ))
        })?;

        let check_year = pick(
            overrides.check_year.as_deref(),
            ENV_CHECK_YEAR,
            toml_config.check_year.as_deref(),
        )
        .unwrap_or_else(|| DEFAULT_CHECK_YEAR.to_string());

        let settings = Self {
            base_url: normalize_base_url(&base_url),
            token: pick(None, ENV_TOKEN, toml_config.token.as_deref()),
            auth_email: pick(None, ENV_AUTH_EMAIL, toml_config.auth_email.as_deref()),
            auth_password: pick(None, ENV_AUTH_PASSWORD, toml_config.auth_password.as_deref()),
            timeout_sec: pick_numeric(ENV_TIMEOUT_SEC, toml_config.timeout_sec, DEFAULT_TIMEOUT_SEC)?,
            check_year,
            excel_header_row: pick_numeric(
                ENV_EXCEL_HEADER_ROW,
                toml_config.excel_header_row,
                DEFAULT_EXCEL_HEADER_ROW,
            )?,
            rate_limit_ms: pick_numeric(
                ENV_RATE_LIMIT_MS,
                toml_config.rate_limit_ms,
                DEFAULT_RATE_LIMIT_MS,
            )?,
            logging: toml_config.logging.clone(),
        };

        debug!(settings = ?settings, "Resolved settings");
        Ok(settings)
    }

    /// Per-request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }

    /// Minimum spacing between API calls as Duration
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

/// Clean a raw configuration value
///
/// Trims whitespace, strips one pair of matching surrounding quotes and
/// maps empty strings to `None`.
pub fn clean_value(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    let unquoted = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    if unquoted.is_empty() {
        None
    } else {
        Some(unquoted.to_string())
    }
}

/// Normalize the API base URL
///
/// Adds `https://` when no scheme is present and removes trailing slashes so
/// paths can be appended directly.
pub fn normalize_base_url(raw: &str) -> String {
    let with_scheme = if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };
    with_scheme.trim_end_matches('/').to_string()
}

/// Read and clean an environment variable
fn env_value(name: &str) -> Option<String> {
    clean_value(std::env::var(name).ok().as_deref())
}

/// Pick the first configured value across CLI → ENV → TOML
fn pick(cli: Option<&str>, env_name: &str, toml_value: Option<&str>) -> Option<String> {
    clean_value(cli)
        .or_else(|| env_value(env_name))
        .or_else(|| clean_value(toml_value))
}

/// Pick a numeric setting across ENV → TOML → default
fn pick_numeric<T>(env_name: &str, toml_value: Option<T>, default: T) -> Result<T>
where
    T: FromStr,
{
    if let Some(raw) = env_value(env_name) {
        return raw.parse::<T>().map_err(|_| {
            Error::Config(format!(
                "{} must be a non-negative integer, got '{}'",
                env_name, raw
            ))
        });
    }
    Ok(toml_value.unwrap_or(default))
}

/// Default configuration file path for the platform
///
/// Linux checks `~/.config/sidsp/checker.toml` first, then
/// `/etc/sidsp/checker.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("sidsp").join("checker.toml"));

    if cfg!(target_os = "linux") {
        if let Some(path) = &user_config {
            if path.exists() {
                return user_config;
            }
        }
        let system_config = PathBuf::from("/etc/sidsp/checker.toml");
        if system_config.exists() {
            return Some(system_config);
        }
        return user_config;
    }

    user_config
}

/// Load the TOML configuration file
///
/// An explicitly requested file must exist. The platform default file is
/// optional and its absence yields an empty configuration.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            other => {
                warn!(
                    "No config file found{}, using environment and defaults",
                    other
                        .map(|p| format!(" at {}", p.display()))
                        .unwrap_or_default()
                );
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded TOML configuration from {}", path.display());
    Ok(config)
}
