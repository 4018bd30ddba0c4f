//! Comparison result models.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matcher::FieldKind;

/// A compared field, in report order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum RecordField {
    Id,
    Name,
    DateOfBirth,
    Email,
    PhoneNumber,
    Address,
}

impl RecordField {
    /// All fields in the fixed order mismatches are reported.
    pub const ALL: [RecordField; 6] = [
        RecordField::Id,
        RecordField::Name,
        RecordField::DateOfBirth,
        RecordField::Email,
        RecordField::PhoneNumber,
        RecordField::Address,
    ];

    /// Field name as used in serialized records.
    pub fn key(&self) -> &'static str {
        match self {
            RecordField::Id => "id",
            RecordField::Name => "name",
            RecordField::DateOfBirth => "dateOfBirth",
            RecordField::Email => "email",
            RecordField::PhoneNumber => "phoneNumber",
            RecordField::Address => "address",
        }
    }

    /// Human-readable label for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            RecordField::Id => "ID",
            RecordField::Name => "Name",
            RecordField::DateOfBirth => "Date of Birth",
            RecordField::Email => "Email",
            RecordField::PhoneNumber => "Phone Number",
            RecordField::Address => "Address",
        }
    }

    /// Normalization rule for this field.
    pub fn kind(&self) -> FieldKind {
        match self {
            RecordField::PhoneNumber => FieldKind::Phone,
            RecordField::DateOfBirth => FieldKind::Date,
            RecordField::Email => FieldKind::Email,
            RecordField::Id | RecordField::Name | RecordField::Address => FieldKind::Text,
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A field whose normalized values differ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: RecordField,
    /// Normalized expected value
    pub expected: String,
    /// Normalized observed value (empty when the field was absent)
    pub actual: String,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mismatch: expected \"{}\", actual \"{}\"",
            self.field.label(),
            self.expected,
            self.actual
        )
    }
}

/// Outcome of comparing one expected record with one observed row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComparisonResult {
    /// Mismatches in [`RecordField::ALL`] order
    pub mismatches: Vec<FieldMismatch>,
}

impl ComparisonResult {
    /// True iff no field mismatched.
    pub fn is_match(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Fields that mismatched, in report order.
    pub fn mismatched_fields(&self) -> Vec<RecordField> {
        self.mismatches.iter().map(|m| m.field).collect()
    }

    /// One diagnostic line per mismatched field.
    pub fn report_lines(&self) -> Vec<String> {
        self.mismatches.iter().map(|m| m.to_string()).collect()
    }
}
