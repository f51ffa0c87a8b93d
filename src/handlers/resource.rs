// Generic CRUD handlers shared by notes, folders and tags
use axum::extract::State;
use tracing::{debug, info, warn};

use crate::database::StoreError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, PathParams, QueryParams};
use crate::resource::Resource;
use crate::state::AppState;
use crate::validation::{ensure_unique, validate_id};

/// The unique index caught a collision the pre-check missed
fn write_error<R: Resource>(err: StoreError) -> ApiError {
    match err {
        StoreError::UniqueViolation(constraint) => {
            warn!("Unique constraint {} rejected a {} write", constraint, R::COLLECTION);
            ApiError::duplicate(R::UNIQUE_SUBJECT)
        }
        other => other.into(),
    }
}

/// GET /api/:collection
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<R::Query>,
) -> ApiResult<Vec<R>> {
    let filter = R::validate_query(query)?;
    let docs = R::repository(&state).list(&filter).await?;

    debug!("Listed {} {}", docs.len(), R::COLLECTION);
    Ok(ApiResponse::success(docs))
}

/// GET /api/:collection/:id
pub async fn get<R: Resource>(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> ApiResult<R> {
    let id = validate_id(&id)?;
    let doc = R::repository(&state)
        .find_by_id(&id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(ApiResponse::success(doc))
}

/// POST /api/:collection
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<R::Input>,
) -> ApiResult<R> {
    let draft = R::validate_create(input)?;
    let repo = R::repository(&state);

    if let Some(key) = R::draft_key(&draft) {
        ensure_unique::<R, _>(repo, key, None, R::UNIQUE_SUBJECT).await?;
    }

    let doc = repo.create(draft).await.map_err(write_error::<R>)?;
    let location = R::location(doc.id());

    info!("Created {} {}", R::COLLECTION, doc.id());
    Ok(ApiResponse::created(doc, location))
}

/// PUT /api/:collection/:id
///
/// The id is checked before the body so a malformed id wins over a
/// malformed body.
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
    body: Result<JsonBody<R::Input>, ApiError>,
) -> ApiResult<R> {
    let id = validate_id(&id)?;
    let JsonBody(input) = body?;
    let changes = R::validate_update(input)?;
    let repo = R::repository(&state);

    // A missing record is a 404 even when the new key collides
    if let Some(key) = R::changes_key(&changes) {
        if repo.find_by_id(&id).await?.is_none() {
            return Err(ApiError::NotFound);
        }
        ensure_unique::<R, _>(repo, key, Some(&id), R::UNIQUE_SUBJECT).await?;
    }

    let doc = repo
        .update_by_id(&id, changes)
        .await
        .map_err(write_error::<R>)?
        .ok_or(ApiError::NotFound)?;

    info!("Updated {} {}", R::COLLECTION, id);
    Ok(ApiResponse::success(doc))
}

/// DELETE /api/:collection/:id
///
/// Responds 204 whether or not anything was removed.
pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> ApiResult<()> {
    let id = validate_id(&id)?;
    let removed = R::repository(&state).delete_by_id(&id).await?;

    if removed {
        info!("Deleted {} {}", R::COLLECTION, id);
    } else {
        debug!("Delete of missing {} {} is a no-op", R::COLLECTION, id);
    }
    Ok(ApiResponse::no_content())
}
