//! CSV report writer
//!
//! One line per input row. `Present` keeps the familiar `True`/`False`
//! column; `Outcome` tells a checked-and-absent row apart from an error or a
//! row that could not be checked at all.

use crate::batch::CheckRecord;
use crate::error::CheckerResult;
use chrono::{DateTime, Local};
use serde::Serialize;
use sidsp_common::time::{file_stamp, iso_local};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Column order of the report
pub const REPORT_COLUMNS: [&str; 11] = [
    "InputRow",
    "TRN",
    "ApplicationNumber",
    "YearInput",
    "YearChecked",
    "EndpointUsed",
    "HTTPStatus",
    "Present",
    "Outcome",
    "Note",
    "CheckedAt",
];

#[derive(Serialize)]
struct ReportRow<'a> {
    #[serde(rename = "InputRow")]
    input_row: usize,
    #[serde(rename = "TRN")]
    trn: &'a str,
    #[serde(rename = "ApplicationNumber")]
    application_number: &'a str,
    #[serde(rename = "YearInput")]
    year_input: &'a str,
    #[serde(rename = "YearChecked")]
    year_checked: &'a str,
    #[serde(rename = "EndpointUsed")]
    endpoint_used: &'a str,
    #[serde(rename = "HTTPStatus")]
    http_status: u16,
    #[serde(rename = "Present")]
    present: &'static str,
    #[serde(rename = "Outcome")]
    outcome: &'static str,
    #[serde(rename = "Note")]
    note: &'a str,
    #[serde(rename = "CheckedAt")]
    checked_at: String,
}

impl<'a> From<&'a CheckRecord> for ReportRow<'a> {
    fn from(record: &'a CheckRecord) -> Self {
        Self {
            input_row: record.input_row,
            trn: &record.trn,
            application_number: &record.application_number,
            year_input: &record.year_input,
            year_checked: &record.year_checked,
            endpoint_used: &record.verdict.endpoint_used,
            http_status: record.verdict.http_status,
            present: if record.verdict.present() { "True" } else { "False" },
            outcome: record.verdict.outcome.as_str(),
            note: &record.verdict.note,
            checked_at: iso_local(&record.checked_at),
        }
    }
}

/// `results_YYYYMMDD_HHMMSS.csv`, or `results_partial_…` for interrupted runs
pub fn report_file_name(partial: bool, at: &DateTime<Local>) -> String {
    let prefix = if partial { "results_partial" } else { "results" };
    format!("{}_{}.csv", prefix, file_stamp(at))
}

/// Write all records to `path`, header first
pub fn write_report(records: &[CheckRecord], path: &Path) -> CheckerResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(REPORT_COLUMNS)?;
    for record in records {
        writer.serialize(ReportRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a timestamped report into `output_dir`
///
/// Creates the directory when missing. Returns `None` without touching the
/// disk when there is nothing to write.
pub fn save_report(records: &[CheckRecord], output_dir: &Path, partial: bool) -> CheckerResult<Option<PathBuf>> {
    if records.is_empty() {
        warn!("No results to write");
        return Ok(None);
    }

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(report_file_name(partial, &sidsp_common::time::now()));
    write_report(records, &path)?;

    let shown = path.canonicalize().unwrap_or_else(|_| path.clone());
    info!("Results written to {}", shown.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{Outcome, Verdict, NOTE_PRESENT};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn found_record() -> CheckRecord {
        CheckRecord {
            input_row: 1,
            trn: "100379893".to_string(),
            application_number: "SLB-156439".to_string(),
            year_input: String::new(),
            year_checked: "2025".to_string(),
            verdict: Verdict {
                outcome: Outcome::Found,
                http_status: 200,
                endpoint_used: "/api/v2/Applications/ByYearTRN?trn=100379893&year=2025".to_string(),
                note: NOTE_PRESENT.to_string(),
            },
            checked_at: Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn test_report_file_names() {
        let at = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(report_file_name(false, &at), "results_20250102_030405.csv");
        assert_eq!(report_file_name(true, &at), "results_partial_20250102_030405.csv");
    }

    #[test]
    fn test_write_report_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");

        write_report(&[found_record()], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), REPORT_COLUMNS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "1,100379893,SLB-156439,,2025,\
             /api/v2/Applications/ByYearTRN?trn=100379893&year=2025,200,True,FOUND,\
             Present (200 OK with data),2025-01-02T03:04:05.000000"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_save_report_skips_empty() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");

        assert_eq!(save_report(&[], &out, false).unwrap(), None);
        assert!(!out.exists());
    }

    #[test]
    fn test_save_report_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested").join("out");

        let path = save_report(&[found_record()], &out, true).unwrap().unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("results_partial_"));
        assert!(name.ends_with(".csv"));
    }
}
