use async_trait::async_trait;
use thiserror::Error;

use super::document::Document;
use super::object_id::ObjectId;
use crate::models::user::User;

/// Errors surfaced by a repository call
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("stored document is corrupt: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        // 23505 = unique_violation
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Sqlx(err)
    }
}

/// Data access for one collection. Every method is a single round trip.
#[async_trait]
pub trait Repository<D: Document>: Send + Sync {
    async fn list(&self, filter: &D::Filter) -> Result<Vec<D>, StoreError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<D>, StoreError>;

    async fn create(&self, draft: D::Draft) -> Result<D, StoreError>;

    /// `None` when no document has `id`
    async fn update_by_id(&self, id: &ObjectId, changes: D::Changes) -> Result<Option<D>, StoreError>;

    /// Whether a document was removed
    async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, StoreError>;

    /// Whether a document other than `except` already holds `key` as its
    /// unique key. Collections without one keep the default.
    async fn name_taken(&self, _key: &str, _except: Option<&ObjectId>) -> Result<bool, StoreError> {
        Ok(false)
    }

    /// Insert fully-formed documents, ids and timestamps included
    async fn insert_many(&self, docs: Vec<D>) -> Result<usize, StoreError>;

    async fn delete_all(&self) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait UserRepository: Repository<User> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
}
