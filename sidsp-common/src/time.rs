//! Timestamp utilities

use chrono::{DateTime, Local};

/// Get current local timestamp
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Render a timestamp as a file-name-safe suffix (`YYYYMMDD_HHMMSS`)
pub fn file_stamp(at: &DateTime<Local>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Render a timestamp as ISO-8601 with microseconds, no offset
pub fn iso_local(at: &DateTime<Local>) -> String {
    at.naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
