use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{present, rfc3339_millis};
use crate::database::{Document, ObjectId, Repository};
use crate::error::ApiError;
use crate::resource::Resource;
use crate::state::AppState;
use crate::validation::{optional_reference, optional_text, require, validate_reference, validate_tag_ids};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    /// Weak reference; the folder may since have been deleted
    pub folder_id: Option<ObjectId>,
    pub tag_ids: Vec<ObjectId>,
    #[serde(serialize_with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
}

/// Note body as sent by the client, for both POST and PUT
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInput {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub folder_id: Option<Option<String>>,
    pub tag_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub folder_id: Option<ObjectId>,
    pub tag_ids: Vec<ObjectId>,
}

/// Partial update: `None` leaves a field alone. `folder_id: Some(None)`
/// removes the note from its folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteChanges {
    pub title: String,
    pub content: Option<String>,
    pub folder_id: Option<Option<ObjectId>>,
    pub tag_ids: Option<Vec<ObjectId>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteQuery {
    pub search_term: Option<String>,
    pub folder_id: Option<String>,
    pub tag_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub search_term: Option<String>,
    pub folder_id: Option<ObjectId>,
    pub tag_id: Option<ObjectId>,
}

impl NoteInput {
    pub fn into_draft(self) -> Result<NoteDraft, ApiError> {
        let title = require("title", self.title)?;
        let folder_id = match self.folder_id.flatten() {
            Some(raw) => optional_reference("folderId", &raw)?,
            None => None,
        };
        let tag_ids = validate_tag_ids(self.tag_ids.unwrap_or_default())?;
        let content = optional_text("content", self.content)?;

        Ok(NoteDraft {
            title,
            content: content.unwrap_or_default(),
            folder_id,
            tag_ids,
        })
    }

    pub fn into_changes(self) -> Result<NoteChanges, ApiError> {
        let title = require("title", self.title)?;
        let folder_id = match self.folder_id {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => Some(optional_reference("folderId", &raw)?),
        };
        let tag_ids = self.tag_ids.map(validate_tag_ids).transpose()?;
        let content = optional_text("content", self.content)?;

        Ok(NoteChanges {
            title,
            content,
            folder_id,
            tag_ids,
        })
    }
}

impl NoteQuery {
    pub fn into_filter(self) -> Result<NoteFilter, ApiError> {
        let folder_id = match self.folder_id.filter(|raw| !raw.is_empty()) {
            Some(raw) => Some(validate_reference("folderId", &raw)?),
            None => None,
        };
        let tag_id = match self.tag_id.filter(|raw| !raw.is_empty()) {
            Some(raw) => Some(validate_reference("tagId", &raw)?),
            None => None,
        };

        Ok(NoteFilter {
            search_term: optional_text("searchTerm", self.search_term.filter(|term| !term.is_empty()))?,
            folder_id,
            tag_id,
        })
    }
}

impl Document for Note {
    type Draft = NoteDraft;
    type Changes = NoteChanges;
    type Filter = NoteFilter;

    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn from_draft(id: ObjectId, draft: NoteDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            folder_id: draft.folder_id,
            tag_ids: draft.tag_ids,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: NoteChanges, updated_at: DateTime<Utc>) {
        self.title = changes.title;
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(folder_id) = changes.folder_id {
            self.folder_id = folder_id;
        }
        if let Some(tag_ids) = changes.tag_ids {
            self.tag_ids = tag_ids;
        }
        self.updated_at = updated_at;
    }

    fn matches(&self, filter: &NoteFilter) -> bool {
        let text_matches = match &filter.search_term {
            Some(term) => self.title.contains(term.as_str()) || self.content.contains(term.as_str()),
            None => true,
        };
        let folder_matches = filter.folder_id.is_none() || filter.folder_id == self.folder_id;
        let tag_matches = filter.tag_id.map_or(true, |tag| self.tag_ids.contains(&tag));

        text_matches && folder_matches && tag_matches
    }
}

impl Resource for Note {
    const COLLECTION: &'static str = "notes";

    type Input = NoteInput;
    type Query = NoteQuery;

    fn repository(state: &AppState) -> &dyn Repository<Self> {
        state.notes.as_ref()
    }

    fn validate_query(query: NoteQuery) -> Result<NoteFilter, ApiError> {
        query.into_filter()
    }

    fn validate_create(input: NoteInput) -> Result<NoteDraft, ApiError> {
        input.into_draft()
    }

    fn validate_update(input: NoteInput) -> Result<NoteChanges, ApiError> {
        input.into_changes()
    }
}
