//! Shared row types

use std::collections::BTreeMap;

/// Canonical column holding the customer's Tax Registration Number
pub const CUSTOMER_TRN: &str = "CUSTOMER_TRN";
/// Canonical column holding the academic year
pub const ACADEMIC_YEAR: &str = "ACADEMIC_YEAR";
/// Canonical column holding the application registration number (e.g. SLB-156439)
pub const REGISTRATION_NO: &str = "REGISTRATION_NO";
/// Canonical column holding the beneficiary's TRN
pub const BENEFICIARY_TRN: &str = "BENEFICIARY_TRN";

/// One input row after header normalization
///
/// Blank cells are absent from `fields`. `input_row` is 1-based and is the
/// row's identity in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub input_row: usize,
    pub fields: BTreeMap<String, String>,
}

impl NormalizedRow {
    pub fn new(input_row: usize) -> Self {
        Self {
            input_row,
            fields: BTreeMap::new(),
        }
    }

    /// Builder used by tests and loaders
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn customer_trn(&self) -> Option<&str> {
        self.get(CUSTOMER_TRN)
    }

    pub fn academic_year(&self) -> Option<&str> {
        self.get(ACADEMIC_YEAR)
    }

    pub fn registration_no(&self) -> Option<&str> {
        self.get(REGISTRATION_NO)
    }
}
