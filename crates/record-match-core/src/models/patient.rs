//! Patient record models.

use serde::{Deserialize, Serialize};

use crate::{MatchError, MatchResult};

/// The patient a test expects to find in the listing.
///
/// Every field is required; deserializing a record with a missing field fails
/// rather than producing a half-filled value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedRecord {
    /// Patient ID as shown in the listing
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Date of birth in the listing's display format
    pub date_of_birth: String,
    pub email: String,
    /// Phone number in any format (normalized before comparison)
    pub phone_number: String,
    pub address: String,
}

impl ExpectedRecord {
    /// Parse and validate an expected record from JSON.
    pub fn from_json(json: &str) -> MatchResult<Self> {
        let record: Self = serde_json::from_str(json)?;
        record.validate()?;
        Ok(record)
    }

    /// Reject records that cannot identify a listing row.
    pub fn validate(&self) -> MatchResult<()> {
        if self.id.trim().is_empty() {
            return Err(MatchError::InvalidInput(
                "expected record id cannot be empty".into(),
            ));
        }
        Ok(())
    }

    /// Name as the listing displays it: `"{last}, {first}"`.
    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// One row read from the live listing.
///
/// Any field may be absent while the listing is still loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObservedRecord {
    #[serde(default)]
    pub id: Option<String>,
    /// Displayed name cell, `"Last, First"`
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl ObservedRecord {
    /// The row a correct listing would show for `expected`.
    pub fn from_expected(expected: &ExpectedRecord) -> Self {
        Self {
            id: Some(expected.id.clone()),
            name: Some(expected.full_name()),
            date_of_birth: Some(expected.date_of_birth.clone()),
            email: Some(expected.email.clone()),
            phone_number: Some(expected.phone_number.clone()),
            address: Some(expected.address.clone()),
        }
    }

    /// Parse a single observed row from JSON.
    pub fn from_json(json: &str) -> MatchResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Last-name part of the displayed name (before the comma).
    pub fn last_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(|n| n.split_once(',').map_or(n, |(last, _)| last).trim())
    }

    /// Given-names part of the displayed name (after the comma).
    pub fn given_names(&self) -> Option<&str> {
        self.name
            .as_deref()
            .and_then(|n| n.split_once(','))
            .map(|(_, given)| given.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JANE: &str = r#"{
        "id": "42",
        "firstName": "Jane",
        "lastName": "Doe",
        "dateOfBirth": "1990-01-01",
        "email": "j@x.com",
        "phoneNumber": "+15551234567",
        "address": "1 Main St"
    }"#;

    #[test]
    fn test_expected_from_json() {
        let record = ExpectedRecord::from_json(JANE).unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.full_name(), "Doe, Jane");
    }

    #[test]
    fn test_expected_missing_field_rejected() {
        let json = r#"{"id": "42", "firstName": "Jane", "lastName": "Doe"}"#;
        let err = ExpectedRecord::from_json(json).unwrap_err();
        assert!(matches!(err, MatchError::Serialization(_)));
    }

    #[test]
    fn test_expected_empty_id_rejected() {
        let json = JANE.replace("\"42\"", "\"  \"");
        let err = ExpectedRecord::from_json(&json).unwrap_err();
        assert!(matches!(err, MatchError::InvalidInput(_)));
    }

    #[test]
    fn test_observed_allows_missing_fields() {
        let row = ObservedRecord::from_json(r#"{"id": "42"}"#).unwrap();
        assert_eq!(row.id.as_deref(), Some("42"));
        assert!(row.email.is_none());
    }

    #[test]
    fn test_observed_name_parts() {
        let row = ObservedRecord {
            name: Some("Doe, Jane Ann".into()),
            ..Default::default()
        };
        assert_eq!(row.last_name(), Some("Doe"));
        assert_eq!(row.given_names(), Some("Jane Ann"));

        let unnamed = ObservedRecord::default();
        assert_eq!(unnamed.last_name(), None);
        assert_eq!(unnamed.given_names(), None);
    }
}
