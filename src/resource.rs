use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::{Document, ObjectId, Repository};
use crate::error::ApiError;
use crate::state::AppState;

/// A document exposed as a REST collection under `/api/<COLLECTION>`.
///
/// Ties together the request types, their validation, and the repository
/// the generic handlers in `handlers::resource` operate on.
pub trait Resource: Document + Serialize {
    const COLLECTION: &'static str;

    /// How a unique-key collision is reported, as in "The folder name already exists"
    const UNIQUE_SUBJECT: &'static str = "record";

    /// Create/update body
    type Input: DeserializeOwned + Send + 'static;

    /// List query string
    type Query: DeserializeOwned + Send + 'static;

    fn repository(state: &AppState) -> &dyn Repository<Self>;

    fn validate_query(query: Self::Query) -> Result<Self::Filter, ApiError>;

    fn validate_create(input: Self::Input) -> Result<Self::Draft, ApiError>;

    fn validate_update(input: Self::Input) -> Result<Self::Changes, ApiError>;

    /// Unique key a create would claim, checked before the insert
    fn draft_key(_draft: &Self::Draft) -> Option<&str> {
        None
    }

    fn changes_key(_changes: &Self::Changes) -> Option<&str> {
        None
    }

    fn location(id: &ObjectId) -> String {
        format!("/api/{}/{}", Self::COLLECTION, id)
    }
}
