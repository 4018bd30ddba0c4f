//! Record matcher.
//!
//! Pipeline: Normalization (per field) → Comparison → Mismatch report

mod normalizer;

pub use normalizer::*;

use crate::models::{ComparisonResult, ExpectedRecord, FieldMismatch, ObservedRecord, RecordField};

/// Compares an expected record with an observed listing row.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordComparator;

impl RecordComparator {
    /// Create a new comparator.
    pub fn new() -> Self {
        Self
    }

    /// Compare field by field, collecting every mismatch in report order.
    ///
    /// Absent observed fields compare as empty strings. Mismatches are also
    /// emitted as `warn` events; that reporting does not affect the result.
    pub fn compare(
        &self,
        expected: &ExpectedRecord,
        observed: &ObservedRecord,
    ) -> ComparisonResult {
        let full_name = expected.full_name();

        let mismatches: Vec<FieldMismatch> = RecordField::ALL
            .iter()
            .filter_map(|&field| {
                let expected_raw = match field {
                    RecordField::Id => expected.id.as_str(),
                    RecordField::Name => full_name.as_str(),
                    RecordField::DateOfBirth => expected.date_of_birth.as_str(),
                    RecordField::Email => expected.email.as_str(),
                    RecordField::PhoneNumber => expected.phone_number.as_str(),
                    RecordField::Address => expected.address.as_str(),
                };
                let actual_raw = observed_field(observed, field).unwrap_or_default();

                let expected_norm = normalize(field.kind(), expected_raw);
                let actual_norm = normalize(field.kind(), actual_raw);

                (expected_norm != actual_norm).then(|| FieldMismatch {
                    field,
                    expected: expected_norm,
                    actual: actual_norm,
                })
            })
            .collect();

        let result = ComparisonResult { mismatches };

        if !result.is_match() {
            tracing::warn!(patient_id = %expected.id, "patient verification failed");
            for line in result.report_lines() {
                tracing::warn!(patient_id = %expected.id, "  - {}", line);
            }
        }

        result
    }
}

fn observed_field(observed: &ObservedRecord, field: RecordField) -> Option<&str> {
    match field {
        RecordField::Id => observed.id.as_deref(),
        RecordField::Name => observed.name.as_deref(),
        RecordField::DateOfBirth => observed.date_of_birth.as_deref(),
        RecordField::Email => observed.email.as_deref(),
        RecordField::PhoneNumber => observed.phone_number.as_deref(),
        RecordField::Address => observed.address.as_deref(),
    }
}
