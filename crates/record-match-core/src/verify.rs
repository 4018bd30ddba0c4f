//! "Patient present" verification over a paged listing.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use crate::finder::{FindOutcome, RetryingFinder};
use crate::matcher::RecordComparator;
use crate::models::{ExpectedRecord, FieldMismatch, ObservedRecord};
use crate::source::{RecordSource, SourceError};
use crate::{MatchError, MatchResult};

/// Result of looking for one patient in a listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationReport {
    pub patient_id: String,
    pub present: bool,
    pub attempts: u32,
    /// Mismatches from the last attempt that saw the patient's row
    pub mismatches: Vec<FieldMismatch>,
    pub last_error: Option<String>,
}

impl VerificationReport {
    /// Turn a soft failure into an error.
    pub fn into_result(self) -> MatchResult<Self> {
        if self.present {
            Ok(self)
        } else {
            Err(MatchError::NotPresent {
                id: self.patient_id,
                attempts: self.attempts,
            })
        }
    }

    /// One diagnostic line per mismatch from the final attempt.
    pub fn report_lines(&self) -> Vec<String> {
        self.mismatches.iter().map(|m| m.to_string()).collect()
    }
}

/// Verifies that an expected patient is listed with matching fields.
#[derive(Debug, Clone, Copy)]
pub struct PatientVerifier {
    finder: RetryingFinder,
    comparator: RecordComparator,
}

impl PatientVerifier {
    pub fn new(finder: RetryingFinder) -> Self {
        Self {
            finder,
            comparator: RecordComparator::new(),
        }
    }

    /// Search the listing page by page until the patient's row is visible
    /// and every field matches, or the attempt bound is reached.
    ///
    /// Each attempt reads the listing once; the row lookup and the
    /// nearest-candidate log both use that snapshot.
    pub fn verify_present<S: RecordSource>(
        &self,
        source: &mut S,
        expected: &ExpectedRecord,
    ) -> VerificationReport {
        let source = RefCell::new(source);
        let last_mismatches: RefCell<Vec<FieldMismatch>> = RefCell::new(Vec::new());

        let outcome = self.finder.try_find(
            || -> Result<bool, SourceError> {
                let rows = source.borrow_mut().current_rows()?;
                let id = expected.id.as_str();
                let Some(row) = rows.iter().find(|r| r.id.as_deref() == Some(id)) else {
                    tracing::debug!(patient_id = %expected.id, "row not visible on current page");
                    log_nearest_candidate(&rows, expected);
                    return Ok(false);
                };

                let result = self.comparator.compare(expected, row);
                let is_match = result.is_match();
                *last_mismatches.borrow_mut() = result.mismatches;
                Ok(is_match)
            },
            || source.borrow_mut().advance(),
        );

        let report = match outcome {
            FindOutcome::Found { attempts } => VerificationReport {
                patient_id: expected.id.clone(),
                present: true,
                attempts,
                mismatches: Vec::new(),
                last_error: None,
            },
            FindOutcome::Exhausted {
                attempts,
                last_error,
            } => VerificationReport {
                patient_id: expected.id.clone(),
                present: false,
                attempts,
                mismatches: last_mismatches.into_inner(),
                last_error,
            },
        };

        if report.present {
            tracing::info!(
                patient_id = %report.patient_id,
                attempts = report.attempts,
                "patient verified"
            );
        } else {
            tracing::warn!(
                patient_id = %report.patient_id,
                attempts = report.attempts,
                mismatches = report.mismatches.len(),
                "patient not present"
            );
        }

        report
    }
}

fn log_nearest_candidate(rows: &[ObservedRecord], expected: &ExpectedRecord) {
    if let Some((candidate, score)) = nearest_candidate(rows, expected) {
        tracing::debug!(
            patient_id = %expected.id,
            candidate_id = candidate.id.as_deref().unwrap_or_default(),
            candidate_name = candidate.name.as_deref().unwrap_or_default(),
            similarity = score,
            "nearest visible candidate"
        );
    }
}

/// The visible row whose displayed name is closest to the expected one.
fn nearest_candidate<'a>(
    rows: &'a [ObservedRecord],
    expected: &ExpectedRecord,
) -> Option<(&'a ObservedRecord, f64)> {
    let wanted = expected.full_name().to_lowercase();
    rows.iter()
        .filter_map(|row| {
            let name = row.name.as_deref()?;
            Some((row, jaro_winkler(&wanted, &name.to_lowercase())))
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}
