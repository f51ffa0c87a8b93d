// Entity types and the request payloads that validate into them
pub mod folder;
pub mod note;
pub mod tag;
pub mod user;

pub use folder::Folder;
pub use note::{Note, NoteChanges, NoteDraft, NoteFilter, NoteInput, NoteQuery};
pub use tag::Tag;
pub use user::{NewUser, User, UserChanges, UserDraft};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::ApiError;
use crate::validation::{optional_text, require};

/// Body of a folder or tag create/update
#[derive(Debug, Default, Deserialize)]
pub struct NameInput {
    pub name: Option<String>,
}

impl NameInput {
    pub fn into_draft(self) -> Result<NameDraft, ApiError> {
        Ok(NameDraft {
            name: require("name", self.name)?,
        })
    }
}

/// Validated folder or tag payload, used for both create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameDraft {
    pub name: String,
}

/// `?searchTerm=` as received
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search_term: Option<String>,
}

impl SearchQuery {
    pub fn into_filter(self) -> Result<SearchFilter, ApiError> {
        Ok(SearchFilter {
            search_term: optional_text("searchTerm", self.search_term.filter(|term| !term.is_empty()))?,
        })
    }
}

/// Case-sensitive literal substring filter; `None` matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub search_term: Option<String>,
}

impl SearchFilter {
    pub fn matches(&self, text: &str) -> bool {
        match &self.search_term {
            Some(term) => text.contains(term.as_str()),
            None => true,
        }
    }
}

/// Distinguishes a field sent as `null` (`Some(None)`) from one left out
/// (`None`). Pair with `#[serde(default)]`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Timestamps go out as RFC 3339 with exactly three fractional digits
pub(crate) fn rfc3339_millis<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_search_term_means_no_filter() {
        let filter = SearchQuery { search_term: Some(String::new()) }.into_filter().unwrap();
        assert_eq!(filter, SearchFilter::default());
        assert!(filter.matches("anything"));
    }

    #[test]
    fn search_is_a_case_sensitive_literal() {
        let filter = SearchFilter { search_term: Some("a.c".to_string()) };
        assert!(filter.matches("xa.cx"));
        assert!(!filter.matches("abc"));
        assert!(!filter.matches("A.C"));
    }

    #[test]
    fn name_input_requires_a_non_empty_name() {
        assert_eq!(NameInput { name: None }.into_draft(), Err(ApiError::missing_field("name")));
        assert_eq!(
            NameInput { name: Some(String::new()) }.into_draft(),
            Err(ApiError::missing_field("name"))
        );
        assert_eq!(
            NameInput { name: Some("Work".to_string()) }.into_draft().unwrap().name,
            "Work"
        );
    }
}
