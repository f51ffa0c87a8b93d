//! Request checks that run before any store call

use std::collections::HashSet;

use crate::database::{Document, ObjectId, Repository};
use crate::error::ApiError;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 72;

/// Parse the `:id` path segment
pub fn validate_id(raw: &str) -> Result<ObjectId, ApiError> {
    validate_reference("id", raw)
}

/// Parse an id carried in `field`; only the syntax is checked
pub fn validate_reference(field: &str, raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse(raw).map_err(|_| ApiError::invalid_id(field))
}

/// Like [`validate_reference`], but an empty string means "no reference"
pub fn optional_reference(field: &str, raw: &str) -> Result<Option<ObjectId>, ApiError> {
    if raw.is_empty() {
        return Ok(None);
    }
    validate_reference(field, raw).map(Some)
}

/// A required string field; absent, `null` and `""` all count as missing
pub fn require(field: &str, value: Option<String>) -> Result<String, ApiError> {
    let value = value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::missing_field(field))?;
    validate_text(field, &value)?;
    Ok(value)
}

/// Stored text may not carry NUL, which PostgreSQL `TEXT` cannot hold
pub fn validate_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.contains('\0') {
        return Err(ApiError::invalid_field(format!(
            "The `{}` cannot contain NUL characters",
            field
        )));
    }
    Ok(())
}

/// [`validate_text`] for a field that may be left out
pub fn optional_text(field: &str, value: Option<String>) -> Result<Option<String>, ApiError> {
    if let Some(value) = &value {
        validate_text(field, value)?;
    }
    Ok(value)
}

/// Parse every tag id, dropping repeats but keeping first-seen order
pub fn validate_tag_ids(raw: Vec<String>) -> Result<Vec<ObjectId>, ApiError> {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut ids = Vec::with_capacity(raw.len());
    for entry in raw {
        let id = ObjectId::parse(&entry)
            .map_err(|_| ApiError::invalid_field("The `tagIds` array contains an invalid `id`"))?;
        if seen.insert(id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return Err(ApiError::invalid_field(format!(
            "The `password` must be between {} and {} characters long",
            PASSWORD_MIN_LEN, PASSWORD_MAX_LEN
        )));
    }
    Ok(())
}

/// Reject leading or trailing whitespace in credential fields
pub fn validate_trimmed(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim() != value {
        return Err(ApiError::invalid_field(format!(
            "The `{}` cannot start or end with whitespace",
            field
        )));
    }
    Ok(())
}

/// Best-effort pre-check of a unique key. The store's own constraint is
/// what actually holds under concurrent writes.
pub async fn ensure_unique<D, R>(
    repo: &R,
    key: &str,
    except: Option<&ObjectId>,
    subject: &str,
) -> Result<(), ApiError>
where
    D: Document,
    R: Repository<D> + ?Sized,
{
    if repo.name_taken(key, except).await? {
        tracing::warn!("Rejected duplicate {}: {:?}", subject, key);
        return Err(ApiError::duplicate(subject));
    }
    Ok(())
}
