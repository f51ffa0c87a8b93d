use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{rfc3339_millis, NameDraft, NameInput, SearchFilter, SearchQuery};
use crate::database::{Document, ObjectId, Repository};
use crate::error::ApiError;
use crate::resource::Resource;
use crate::state::AppState;

/// Label attached to notes through `Note::tag_ids`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: ObjectId,
    pub name: String,
    #[serde(serialize_with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Document for Tag {
    type Draft = NameDraft;
    type Changes = NameDraft;
    type Filter = SearchFilter;

    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn from_draft(id: ObjectId, draft: NameDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: NameDraft, updated_at: DateTime<Utc>) {
        self.name = changes.name;
        self.updated_at = updated_at;
    }

    fn matches(&self, filter: &SearchFilter) -> bool {
        filter.matches(&self.name)
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
    }
}

impl Resource for Tag {
    const COLLECTION: &'static str = "tags";
    const UNIQUE_SUBJECT: &'static str = "tag name";

    type Input = NameInput;
    type Query = SearchQuery;

    fn repository(state: &AppState) -> &dyn Repository<Self> {
        state.tags.as_ref()
    }

    fn validate_query(query: SearchQuery) -> Result<SearchFilter, ApiError> {
        query.into_filter()
    }

    fn validate_create(input: NameInput) -> Result<NameDraft, ApiError> {
        input.into_draft()
    }

    fn validate_update(input: NameInput) -> Result<NameDraft, ApiError> {
        input.into_draft()
    }

    fn draft_key(draft: &NameDraft) -> Option<&str> {
        Some(&draft.name)
    }

    fn changes_key(changes: &NameDraft) -> Option<&str> {
        Some(&changes.name)
    }
}
