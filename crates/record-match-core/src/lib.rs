//! Record Match Core Library
//!
//! Verifies that a patient listing shows an expected patient, field by field,
//! against a listing that is paginated and updates asynchronously.
//!
//! # Architecture
//!
//! ```text
//!   ExpectedRecord                       RecordSource (paged listing)
//!         │                                        │
//!         │              ┌─────────────────────────┤
//!         ▼              ▼                         │
//!   PatientVerifier ── RetryingFinder ── advance ──┘
//!         │
//!         ▼
//!   RecordComparator ── Normalizer (per field)
//!         │
//!         ▼
//!   ComparisonResult → VerificationReport
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (ExpectedRecord, ObservedRecord, FieldMismatch, etc.)
//! - [`matcher`]: Field normalizer and record comparator
//! - [`finder`]: Bounded retry loop over an eventually consistent source
//! - [`source`]: Record source trait and an in-memory paged listing
//! - [`verify`]: "Patient present" verification built on the above
//! - [`config`]: Retry configuration resolved at start-up

pub mod config;
pub mod finder;
pub mod matcher;
pub mod models;
pub mod source;
pub mod verify;

// Re-export commonly used types
pub use config::MatchConfig;
pub use finder::{FindOutcome, FinderConfig, FinderError, RetryingFinder};
pub use matcher::{normalize, FieldKind, RecordComparator};
pub use models::{ComparisonResult, ExpectedRecord, FieldMismatch, ObservedRecord, RecordField};
pub use source::{PagedRecords, PatientSearch, RecordSource, SourceError};
pub use verify::{PatientVerifier, VerificationReport};

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Finder error: {0}")]
    Finder(#[from] FinderError),

    #[error("Patient {id} not present after {attempts} attempt(s)")]
    NotPresent { id: String, attempts: u32 },
}

pub type MatchResult<T> = Result<T, MatchError>;
