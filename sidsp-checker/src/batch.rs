//! Batch driver
//!
//! Resolves rows one at a time, strictly in order. A record is committed only
//! after its row is fully resolved, so an interrupt keeps every finished
//! record and drops the in-flight one.

use crate::resolver::{resolve, Outcome, Verdict};
use crate::sequencer::{resolve_year, sequence};
use crate::transport::Transport;
use crate::types::NormalizedRow;
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Log progress every N rows
pub const PROGRESS_INTERVAL: usize = 10;

/// One report line: the row's identity plus its verdict
#[derive(Debug, Clone, PartialEq)]
pub struct CheckRecord {
    pub input_row: usize,
    pub trn: String,
    pub application_number: String,
    /// Year as given in the input, empty if absent
    pub year_input: String,
    /// Year actually sent to the year-specific endpoints
    pub year_checked: String,
    pub verdict: Verdict,
    /// Commit time, stamped by the driver
    pub checked_at: DateTime<Local>,
}

impl CheckRecord {
    pub fn new(row: &NormalizedRow, default_year: &str, verdict: Verdict, checked_at: DateTime<Local>) -> Self {
        Self {
            input_row: row.input_row,
            trn: row.customer_trn().unwrap_or_default().to_string(),
            application_number: row.registration_no().unwrap_or_default().to_string(),
            year_input: row.academic_year().unwrap_or_default().to_string(),
            year_checked: resolve_year(row.academic_year(), default_year).to_string(),
            verdict,
            checked_at,
        }
    }
}

/// Sequence, resolve and timestamp one row
pub async fn check_row<T>(transport: &T, row: &NormalizedRow, default_year: &str) -> CheckRecord
where
    T: Transport + ?Sized,
{
    let candidates = sequence(row, default_year);
    let verdict = resolve(transport, &candidates).await;
    CheckRecord::new(row, default_year, verdict, sidsp_common::time::now())
}

/// Result of a batch run
#[derive(Debug)]
pub struct BatchRun {
    pub records: Vec<CheckRecord>,
    /// True when cancelled before every row was resolved
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl BatchRun {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_records(&self.records)
    }
}

/// Outcome counts for a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub errors: usize,
    pub unresolvable: usize,
}

impl BatchSummary {
    pub fn from_records(records: &[CheckRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };
        for record in records {
            match record.verdict.outcome {
                Outcome::Found => summary.present += 1,
                Outcome::Absent => summary.absent += 1,
                Outcome::Error => summary.errors += 1,
                Outcome::Unresolvable => summary.unresolvable += 1,
            }
        }
        summary
    }
}

/// Resolve every row in order until done or cancelled
pub async fn run_batch<T>(
    transport: &T,
    rows: &[NormalizedRow],
    default_year: &str,
    cancel: &CancellationToken,
) -> BatchRun
where
    T: Transport + ?Sized,
{
    let start = Instant::now();
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        if i > 0 && i % PROGRESS_INTERVAL == 0 {
            log_progress(i, rows.len(), start.elapsed());
        }

        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            record = check_row(transport, row, default_year) => Some(record),
        };

        let Some(record) = next else {
            warn!(
                completed = records.len(),
                total = rows.len(),
                "Interrupted, stopping before row {}",
                row.input_row
            );
            return BatchRun {
                records,
                interrupted: true,
                elapsed: start.elapsed(),
            };
        };

        debug!(
            input_row = record.input_row,
            outcome = %record.verdict.outcome,
            status = record.verdict.http_status,
            endpoint = %record.verdict.endpoint_used,
            "{}",
            record.verdict.note
        );
        records.push(record);
    }

    BatchRun {
        records,
        interrupted: false,
        elapsed: start.elapsed(),
    }
}

fn log_progress(done: usize, total: usize, elapsed: Duration) {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 { done as f64 / secs } else { 0.0 };
    let eta_secs = if rate > 0.0 {
        (total - done) as f64 / rate
    } else {
        0.0
    };

    info!(
        "Progress: {}/{} ({:.1}%) | ETA: {:.1}m",
        done,
        total,
        done as f64 / total as f64 * 100.0,
        eta_secs / 60.0
    );
}

/// Log the end-of-run summary
pub fn log_summary(run: &BatchRun) {
    let summary = run.summary();
    info!("{}", "-".repeat(50));
    info!("Processing complete in {:.1} seconds", run.elapsed.as_secs_f64());
    info!("Total Rows: {}", summary.total);
    info!("Present (200 OK): {}", summary.present);
    info!("Absent (404/empty): {}", summary.absent);
    info!("Errors (Other): {}", summary.errors);
    info!("Unresolvable (no TRN): {}", summary.unresolvable);
    info!("{}", "-".repeat(50));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::NO_STRATEGY;
    use crate::types::{ACADEMIC_YEAR, CUSTOMER_TRN, REGISTRATION_NO};

    fn verdict(outcome: Outcome) -> Verdict {
        Verdict {
            outcome,
            http_status: 200,
            endpoint_used: "/x".to_string(),
            note: String::new(),
        }
    }

    fn record(outcome: Outcome) -> CheckRecord {
        CheckRecord::new(&NormalizedRow::new(1), "2025", verdict(outcome), Local::now())
    }

    #[test]
    fn test_record_copies_row_identity() {
        let row = NormalizedRow::new(7)
            .with_field(CUSTOMER_TRN, "100379893")
            .with_field(REGISTRATION_NO, "SLB-156439")
            .with_field(ACADEMIC_YEAR, "2025.0");

        let rec = CheckRecord::new(&row, "2025", Verdict::unresolvable(), Local::now());
        assert_eq!(rec.input_row, 7);
        assert_eq!(rec.trn, "100379893");
        assert_eq!(rec.application_number, "SLB-156439");
        assert_eq!(rec.year_input, "2025.0");
        assert_eq!(rec.year_checked, "2025");
        assert_eq!(rec.verdict.endpoint_used, NO_STRATEGY);
    }

    #[test]
    fn test_summary_counts_each_outcome() {
        let records = vec![
            record(Outcome::Found),
            record(Outcome::Found),
            record(Outcome::Absent),
            record(Outcome::Error),
            record(Outcome::Unresolvable),
        ];

        let summary = BatchSummary::from_records(&records);
        assert_eq!(
            summary,
            BatchSummary {
                total: 5,
                present: 2,
                absent: 1,
                errors: 1,
                unresolvable: 1,
            }
        );
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(BatchSummary::from_records(&[]), BatchSummary::default());
    }
}
