//! Header normalization and row building
//!
//! Spreadsheet headers arrive as "Customer TRN", "customer_trn",
//! "CUSTOMER_TRN" and so on. All of them map to one canonical column name.

use crate::error::{CheckerError, CheckerResult};
use crate::types::{NormalizedRow, ACADEMIC_YEAR, BENEFICIARY_TRN, CUSTOMER_TRN, REGISTRATION_NO};

/// Columns every input must provide
pub const REQUIRED_COLUMNS: &[&str] = &[CUSTOMER_TRN];

/// Remove whitespace and underscores, then uppercase
///
/// `"Customer TRN"` and `"customer_trn"` both become `"CUSTOMERTRN"`.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_uppercase()
}

/// Canonical column name for a raw header
///
/// Unknown headers keep their normalized form.
pub fn canonical_name(header: &str) -> String {
    let normalized = normalize_header(header);
    match normalized.as_str() {
        "CUSTOMERTRN" => CUSTOMER_TRN.to_string(),
        "REGISTRATIONNO" => REGISTRATION_NO.to_string(),
        "ACADEMICYEAR" => ACADEMIC_YEAR.to_string(),
        "BENEFICIARYTRN" => BENEFICIARY_TRN.to_string(),
        _ => normalized,
    }
}

/// Canonical name per column index
///
/// `None` marks columns that are ignored: blank headers and later duplicates
/// of a canonical name (the first column wins).
pub fn column_names(headers: &[String]) -> Vec<Option<String>> {
    let mut seen: Vec<String> = Vec::with_capacity(headers.len());
    headers
        .iter()
        .map(|header| {
            let name = canonical_name(header.trim_start_matches('\u{feff}'));
            if name.is_empty() || seen.contains(&name) {
                None
            } else {
                seen.push(name.clone());
                Some(name)
            }
        })
        .collect()
}

/// Turn raw header + records into numbered rows
///
/// Fully blank records are dropped before numbering; blank cells are left
/// out of the row's fields.
pub fn build_rows<I>(headers: &[String], records: I) -> CheckerResult<Vec<NormalizedRow>>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let columns = column_names(headers);

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !columns.iter().flatten().any(|name| name.as_str() == *required))
        .collect();
    if !missing.is_empty() {
        let available: Vec<&str> = columns.iter().flatten().map(String::as_str).collect();
        return Err(CheckerError::Input(format!(
            "Required columns missing: {:?}. Available columns after normalization: {:?}",
            missing, available
        )));
    }

    let mut rows = Vec::new();
    for record in records {
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut row = NormalizedRow::new(rows.len() + 1);
        for (name, cell) in columns.iter().zip(record) {
            if let Some(name) = name {
                if !cell.trim().is_empty() {
                    row.fields.insert(name.clone(), cell);
                }
            }
        }
        rows.push(row);
    }

    Ok(rows)
}
