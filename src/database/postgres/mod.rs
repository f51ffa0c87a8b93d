//! PostgreSQL-backed repositories. Ids are stored as lowercase hex text.

mod named;
mod notes;
mod users;

pub use named::{NamedDocument, PgNamedRepository};
pub use notes::PgNoteRepository;
pub use users::PgUserRepository;

use super::object_id::ObjectId;
use super::repository::StoreError;

fn parse_stored_id(raw: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse(raw).map_err(|err| StoreError::Corrupt(err.to_string()))
}
