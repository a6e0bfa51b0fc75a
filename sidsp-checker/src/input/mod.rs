//! Input file loading
//!
//! Supported formats: CSV (`.csv`) and spreadsheets (`.xlsx`, `.xls`, `.xlsm`,
//! `.ods`). Every cell is read as text so identifiers keep leading zeros.

pub mod normalize;
pub mod spreadsheet;

use crate::error::{CheckerError, CheckerResult};
use crate::types::NormalizedRow;
use spreadsheet::RawTable;
use std::path::Path;

pub use normalize::{canonical_name, normalize_header};

/// Load and normalize an input file
///
/// `header_row` (0-based) applies to spreadsheets only; CSV headers are
/// always the first line.
pub fn load_input(path: &Path, header_row: usize) -> CheckerResult<Vec<NormalizedRow>> {
    if !path.exists() {
        return Err(CheckerError::Input(format!(
            "Input file not found: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let (headers, records) = match extension.as_str() {
        "csv" => read_csv(path)?,
        "xlsx" | "xls" | "xlsm" | "ods" => spreadsheet::read_spreadsheet(path, header_row)?,
        _ => {
            return Err(CheckerError::Input(format!(
                "Unsupported file type: '.{}'. Only .csv, .xlsx, .xls, .xlsm and .ods files are supported.",
                extension
            )))
        }
    };

    normalize::build_rows(&headers, records)
}

fn read_csv(path: &Path) -> CheckerResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?.iter().map(str::to_string).collect());
    }

    Ok((headers, records))
}
