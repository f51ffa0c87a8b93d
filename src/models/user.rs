use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{rfc3339_millis, SearchFilter};
use crate::database::{Document, ObjectId};

#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: ObjectId,
    pub name: Option<String>,
    pub username: String,
    /// PHC-format password hash
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(serialize_with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
}

// Keep the hash out of log lines
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// `POST /api/users` body
#[derive(Debug, Default, Deserialize)]
pub struct NewUser {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Validated registration, password already hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub name: Option<String>,
    pub username: String,
    pub password: String,
}

/// Partial user update. No route edits users; this is the `Changes` half of
/// the shared `Document`/`Repository` contract, and stores implement it like
/// any other collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl Document for User {
    type Draft = UserDraft;
    type Changes = UserChanges;
    type Filter = SearchFilter;

    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn from_draft(id: ObjectId, draft: UserDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            username: draft.username,
            password: draft.password,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: UserChanges, updated_at: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = Some(name);
        }
        if let Some(password) = changes.password {
            self.password = password;
        }
        self.updated_at = updated_at;
    }

    fn matches(&self, filter: &SearchFilter) -> bool {
        filter.matches(&self.username)
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.username)
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        a.username.cmp(&b.username)
    }
}
