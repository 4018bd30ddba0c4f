//! Record sources: the listing a verification reads from.
//!
//! A source is owned by the calling test and passed in explicitly.

use thiserror::Error;

use crate::matcher::normalize_phone;
use crate::models::ObservedRecord;

/// Errors reading from a record source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed row: {0}")]
    Malformed(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A paginated, eventually consistent listing of observed rows.
pub trait RecordSource {
    /// Rows visible right now.
    fn current_rows(&mut self) -> SourceResult<Vec<ObservedRecord>>;

    /// Move to the next page or wait for the listing to refresh.
    fn advance(&mut self) -> SourceResult<()>;
}

impl<S: RecordSource + ?Sized> RecordSource for &mut S {
    fn current_rows(&mut self) -> SourceResult<Vec<ObservedRecord>> {
        (**self).current_rows()
    }

    fn advance(&mut self) -> SourceResult<()> {
        (**self).advance()
    }
}

/// Search filters for the patient listing.
///
/// Unset or empty filters match every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientSearch {
    pub last_name: Option<String>,
    pub given_names: Option<String>,
    pub date_of_birth: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}

impl PatientSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    pub fn given_names(mut self, value: impl Into<String>) -> Self {
        self.given_names = Some(value.into());
        self
    }

    pub fn date_of_birth(mut self, value: impl Into<String>) -> Self {
        self.date_of_birth = Some(value.into());
        self
    }

    pub fn phone(mut self, value: impl Into<String>) -> Self {
        self.phone = Some(value.into());
        self
    }

    pub fn address(mut self, value: impl Into<String>) -> Self {
        self.address = Some(value.into());
        self
    }

    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    /// True when every filter is empty.
    pub fn is_reset(&self) -> bool {
        [
            &self.last_name,
            &self.given_names,
            &self.date_of_birth,
            &self.phone,
            &self.address,
            &self.email,
        ]
        .iter()
        .all(|f| active(f).is_none())
    }

    /// Clear every filter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check whether a row passes every active filter.
    pub fn matches(&self, row: &ObservedRecord) -> bool {
        if let Some(last) = active(&self.last_name) {
            if !starts_with_ignore_case(row.last_name().unwrap_or_default(), last) {
                return false;
            }
        }

        if let Some(given) = active(&self.given_names) {
            if !starts_with_ignore_case(row.given_names().unwrap_or_default(), given) {
                return false;
            }
        }

        if let Some(dob) = active(&self.date_of_birth) {
            if row.date_of_birth.as_deref() != Some(dob) {
                return false;
            }
        }

        if let Some(phone) = active(&self.phone) {
            let wanted = normalize_phone(phone);
            let have = normalize_phone(row.phone_number.as_deref().unwrap_or_default());
            if wanted.is_empty() || !have.contains(&wanted) {
                return false;
            }
        }

        if let Some(address) = active(&self.address) {
            if !contains_ignore_case(row.address.as_deref().unwrap_or_default(), address) {
                return false;
            }
        }

        if let Some(email) = active(&self.email) {
            if !contains_ignore_case(row.email.as_deref().unwrap_or_default(), email) {
                return false;
            }
        }

        true
    }
}

fn active(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().map(str::trim).filter(|f| !f.is_empty())
}

fn starts_with_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().starts_with(&needle.to_lowercase())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// In-memory listing served one page at a time.
///
/// `advance` moves to the next page and wraps to the first after the last.
#[derive(Debug, Clone)]
pub struct PagedRecords {
    rows: Vec<ObservedRecord>,
    page_size: usize,
    page: usize,
}

impl PagedRecords {
    /// Build a listing of the rows that pass `search`.
    pub fn new(
        rows: Vec<ObservedRecord>,
        page_size: usize,
        search: &PatientSearch,
    ) -> SourceResult<Self> {
        if page_size == 0 {
            return Err(SourceError::Malformed("page size must be at least 1".into()));
        }
        let rows = rows.into_iter().filter(|r| search.matches(r)).collect();
        Ok(Self {
            rows,
            page_size,
            page: 0,
        })
    }

    /// Zero-based index of the visible page.
    pub fn page_index(&self) -> usize {
        self.page
    }

    /// Number of pages (at least 1, even when empty).
    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(self.page_size).max(1)
    }

    /// Total rows across all pages.
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }
}

impl RecordSource for PagedRecords {
    fn current_rows(&mut self) -> SourceResult<Vec<ObservedRecord>> {
        Ok(self
            .rows
            .iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .cloned()
            .collect())
    }

    fn advance(&mut self) -> SourceResult<()> {
        self.page = (self.page + 1) % self.page_count();
        tracing::debug!(
            page = self.page,
            pages = self.page_count(),
            "advanced listing page"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, name: &str, phone: &str) -> ObservedRecord {
        ObservedRecord {
            id: Some(id.into()),
            name: Some(name.into()),
            date_of_birth: Some("1990-01-01".into()),
            email: Some(format!("{}@example.com", id)),
            phone_number: Some(phone.into()),
            address: Some("1 Main St, Springfield".into()),
        }
    }

    fn listing() -> Vec<ObservedRecord> {
        vec![
            row("1", "Doe, Jane", "+1 (555) 123-4567"),
            row("2", "Doe, John", "555-000-1111"),
            row("3", "Smith, Anna", "555-222-3333"),
            row("4", "Dobbs, Jane", "555-444-5555"),
            row("5", "Lee, Sam", "555-666-7777"),
        ]
    }

    #[test]
    fn test_default_search_is_reset() {
        let mut search = PatientSearch::new().last_name("Doe");
        assert!(!search.is_reset());

        search.reset();
        assert!(search.is_reset());

        let blank = PatientSearch::new().email("   ");
        assert!(blank.is_reset());
    }

    #[test]
    fn test_last_name_prefix_case_insensitive() {
        let search = PatientSearch::new().last_name("do");
        let ids: Vec<_> = listing()
            .into_iter()
            .filter(|r| search.matches(r))
            .filter_map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
    }

    #[test]
    fn test_combined_filters() {
        let search = PatientSearch::new().last_name("Doe").given_names("jane");
        let matching: Vec<_> = listing()
            .into_iter()
            .filter(|r| search.matches(r))
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].id.as_deref(), Some("1"));
    }

    #[test]
    fn test_phone_filter_uses_normalized_digits() {
        let search = PatientSearch::new().phone("(555) 123");
        assert!(search.matches(&listing()[0]));
        assert!(!search.matches(&listing()[1]));

        let junk = PatientSearch::new().phone("ext.");
        assert!(!junk.matches(&listing()[0]));
    }

    #[test]
    fn test_address_and_email_substring() {
        let search = PatientSearch::new().address("springfield").email("3@EXAMPLE");
        let ids: Vec<_> = listing()
            .into_iter()
            .filter(|r| search.matches(r))
            .filter_map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["3"]);
    }

    #[test]
    fn test_paging_wraps() {
        let mut pages = PagedRecords::new(listing(), 2, &PatientSearch::default()).unwrap();
        assert_eq!(pages.page_count(), 3);

        assert_eq!(pages.current_rows().unwrap().len(), 2);
        pages.advance().unwrap();
        pages.advance().unwrap();
        let last = pages.current_rows().unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].id.as_deref(), Some("5"));

        pages.advance().unwrap();
        assert_eq!(pages.page_index(), 0);
    }

    #[test]
    fn test_rows_from_current_page_only() {
        let mut pages = PagedRecords::new(listing(), 2, &PatientSearch::default()).unwrap();
        let ids = |rows: Vec<ObservedRecord>| -> Vec<String> {
            rows.into_iter().filter_map(|r| r.id).collect()
        };
        assert_eq!(ids(pages.current_rows().unwrap()), vec!["1", "2"]);

        pages.advance().unwrap();
        assert_eq!(ids(pages.current_rows().unwrap()), vec!["3", "4"]);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = PagedRecords::new(listing(), 0, &PatientSearch::default()).unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let search = PatientSearch::new().last_name("Nobody");
        let mut pages = PagedRecords::new(listing(), 2, &search).unwrap();
        assert_eq!(pages.total_rows(), 0);
        assert_eq!(pages.page_count(), 1);
        pages.advance().unwrap();
        assert!(pages.current_rows().unwrap().is_empty());
    }
}
