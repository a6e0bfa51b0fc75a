//! Endpoint sequencer
//!
//! Decides, from row data alone, which SIDSP lookups are worth trying and in
//! what order. Most specific first: year + TRN on the newest API version, then
//! the previous version, then TRN-only on both versions.
//!
//! Pure: no I/O, no logging.

use crate::types::NormalizedRow;

pub const BY_YEAR_TRN_V2: &str = "/api/v2/Applications/ByYearTRN";
pub const BY_YEAR_TRN_V1: &str = "/api/v1/Applications/ByYearTRN";
pub const BY_TRN_V2: &str = "/api/v2/Applications/ByTRN";
pub const BY_TRN_V1: &str = "/api/v1/Applications/ByTRN";

/// Query parameters for one lookup
///
/// Only `trn` and an optional `year` ever appear, so this is a fixed-shape
/// record rather than an open map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub trn: String,
    pub year: Option<String>,
}

impl QueryParams {
    pub fn by_trn(trn: &str) -> Self {
        Self {
            trn: trn.to_string(),
            year: None,
        }
    }

    pub fn by_year_trn(trn: &str, year: &str) -> Self {
        Self {
            trn: trn.to_string(),
            year: Some(year.to_string()),
        }
    }

    /// True when there is nothing to query with
    pub fn is_empty(&self) -> bool {
        self.trn.is_empty() && self.year.is_none()
    }

    /// Key/value pairs in wire order (`trn` first, then `year`)
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("trn", self.trn.as_str())];
        if let Some(year) = &self.year {
            pairs.push(("year", year.as_str()));
        }
        pairs
    }

    /// Form-urlencoded query string, e.g. `trn=100379893&year=2025`
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }
}

/// One lookup the resolver may try
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    pub path: &'static str,
    pub params: QueryParams,
}

impl EndpointCandidate {
    /// Path plus serialized query, as recorded in the report
    pub fn describe(&self) -> String {
        format!("{}?{}", self.path, self.params.to_query_string())
    }
}

/// Candidates in priority order; empty means the row has no usable identifier
pub type CandidateSequence = Vec<EndpointCandidate>;

/// Build the ordered candidate list for a row
///
/// Returns an empty sequence when the TRN is missing or blank.
pub fn sequence(row: &NormalizedRow, default_year: &str) -> CandidateSequence {
    let trn = row.customer_trn().unwrap_or_default().trim();
    if trn.is_empty() {
        return Vec::new();
    }

    let year = resolve_year(row.academic_year(), default_year);

    vec![
        EndpointCandidate {
            path: BY_YEAR_TRN_V2,
            params: QueryParams::by_year_trn(trn, year),
        },
        EndpointCandidate {
            path: BY_YEAR_TRN_V1,
            params: QueryParams::by_year_trn(trn, year),
        },
        EndpointCandidate {
            path: BY_TRN_V2,
            params: QueryParams::by_trn(trn),
        },
        EndpointCandidate {
            path: BY_TRN_V1,
            params: QueryParams::by_trn(trn),
        },
    ]
}

/// Pick the year to query with
///
/// The row's year wins only when it is a non-empty run of ASCII digits after
/// trimming. Blank cells, `NaN` and values like `2025.0` fall back to
/// `default_year`.
pub fn resolve_year<'a>(row_year: Option<&'a str>, default_year: &'a str) -> &'a str {
    match row_year.map(str::trim) {
        Some(year) if is_valid_year(year) => year,
        _ => default_year,
    }
}

fn is_valid_year(year: &str) -> bool {
    !year.is_empty()
        && !year.eq_ignore_ascii_case("nan")
        && year.chars().all(|c| c.is_ascii_digit())
}
