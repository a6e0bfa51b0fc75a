//! sidsp-checker library - SIDSP application presence checker
//!
//! For each input row, decides whether a loan/scholarship application exists
//! in SIDSP for the row's customer TRN and academic year.
//!
//! Pipeline: input rows → [`sequencer`] (ordered endpoint candidates) →
//! [`resolver`] (walks candidates through a [`transport::Transport`]) →
//! [`batch`] (timestamps and aggregates) → [`report`] (CSV).

pub mod auth;
pub mod batch;
pub mod error;
pub mod input;
pub mod report;
pub mod resolver;
pub mod sequencer;
pub mod transport;
pub mod types;

pub use error::{CheckerError, CheckerResult};
pub use resolver::{resolve, Outcome, Verdict};
pub use sequencer::{sequence, CandidateSequence, EndpointCandidate, QueryParams};
pub use transport::{CallOutcome, Transport};
pub use types::NormalizedRow;
