//! Excel / OpenDocument input via calamine
//!
//! Reads the first worksheet. Rows above `header_row` are skipped; that row
//! holds the headers.

use crate::error::{CheckerError, CheckerResult};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Header cells and data records, all rendered as text
pub type RawTable = (Vec<String>, Vec<Vec<String>>);

pub fn read_spreadsheet(path: &Path, header_row: usize) -> CheckerResult<RawTable> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| CheckerError::Spreadsheet(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CheckerError::Spreadsheet(format!("{}: workbook has no worksheets", path.display())))?
        .map_err(|e| CheckerError::Spreadsheet(format!("{}: {}", path.display(), e)))?;

    // The range starts at the first used row, not at sheet row 0
    let first_used_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range.rows().skip(header_row.saturating_sub(first_used_row));

    let headers = rows
        .next()
        .ok_or_else(|| {
            CheckerError::Input(format!(
                "{}: no header row at index {}",
                path.display(),
                header_row
            ))
        })?
        .iter()
        .map(cell_text)
        .collect();

    let records = rows.map(|row| row.iter().map(cell_text).collect()).collect();

    Ok((headers, records))
}

/// Render a cell as text
///
/// Integral floats lose the `.0` so numeric TRNs and years read back as typed.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
