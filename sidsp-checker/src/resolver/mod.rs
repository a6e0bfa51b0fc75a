//! Presence resolver
//!
//! Walks a [`CandidateSequence`] through a [`Transport`] and produces exactly
//! one [`Verdict`]. The walk is a small state machine:
//!
//! ```text
//! Trying ──200 + data──────────▶ Found   (stop)
//!   │    ──404 / 200 + empty───▶ Trying  (next candidate)
//!   │    ──200 + bad body──────▶ Error   (stop)
//!   │    ──any other status────▶ Error   (stop)
//!   └── candidates exhausted ──▶ Absent
//! ```
//!
//! Errors never fall back to other endpoint variants: auth and server
//! failures repeat identically on every variant.
//!
//! No clock, no logging: the same transport answers give the same verdict.

pub mod classify;

use crate::sequencer::EndpointCandidate;
use crate::transport::Transport;
use classify::{classify, Step};

pub use classify::is_empty_payload;

/// Endpoint recorded when no lookup was attempted
pub const NO_STRATEGY: &str = "NO_STRATEGY";

pub const NOTE_UNRESOLVABLE: &str = "No valid identifier (CUSTOMER_TRN) found";
pub const NOTE_PRESENT: &str = "Present (200 OK with data)";
pub const NOTE_ABSENT: &str = "Absent (404 on all endpoints)";

/// Final classification of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// An endpoint returned data
    Found,
    /// Every endpoint answered 404 or an empty result
    Absent,
    /// An endpoint failed or answered with an unreadable body
    Error,
    /// The row had no usable TRN; nothing was called
    Unresolvable,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Found => "FOUND",
            Outcome::Absent => "ABSENT",
            Outcome::Error => "ERROR",
            Outcome::Unresolvable => "UNRESOLVABLE",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub outcome: Outcome,
    /// Status of the call that decided the verdict, 0 when none was made
    pub http_status: u16,
    /// Path and query of the deciding call, or [`NO_STRATEGY`]
    pub endpoint_used: String,
    pub note: String,
}

impl Verdict {
    /// Verdict for a row without a usable identifier
    pub fn unresolvable() -> Self {
        Self {
            outcome: Outcome::Unresolvable,
            http_status: 0,
            endpoint_used: NO_STRATEGY.to_string(),
            note: NOTE_UNRESOLVABLE.to_string(),
        }
    }

    /// Only `Found` counts as present; every other outcome reports false
    pub fn present(&self) -> bool {
        self.outcome == Outcome::Found
    }
}

/// Resolve presence by walking `candidates` in order
///
/// Candidates with empty parameters are skipped without calling the transport.
pub async fn resolve<T>(transport: &T, candidates: &[EndpointCandidate]) -> Verdict
where
    T: Transport + ?Sized,
{
    // Last call made, kept so an exhausted walk still reports what it tried
    let mut last_attempt: Option<(String, u16)> = None;

    for candidate in candidates {
        if candidate.params.is_empty() {
            continue;
        }

        let outcome = transport.get(candidate.path, &candidate.params).await;
        let endpoint_used = candidate.describe();

        match classify(&outcome) {
            Step::Found => {
                return Verdict {
                    outcome: Outcome::Found,
                    http_status: outcome.status,
                    endpoint_used,
                    note: NOTE_PRESENT.to_string(),
                };
            }
            Step::Error(note) => {
                return Verdict {
                    outcome: Outcome::Error,
                    http_status: outcome.status,
                    endpoint_used,
                    note,
                };
            }
            Step::NotHere => {
                last_attempt = Some((endpoint_used, outcome.status));
            }
        }
    }

    match last_attempt {
        Some((endpoint_used, http_status)) => Verdict {
            outcome: Outcome::Absent,
            http_status,
            endpoint_used,
            note: NOTE_ABSENT.to_string(),
        },
        None => Verdict::unresolvable(),
    }
}
