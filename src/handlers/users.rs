use axum::extract::State;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, PathParams};
use crate::models::{NewUser, User};
use crate::services::UserService;
use crate::state::AppState;
use crate::validation::validate_id;

fn location(user: &User) -> String {
    format!("/api/users/{}", user.id)
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewUser>,
) -> ApiResult<User> {
    let user = UserService::from_state(&state).register(input).await?;
    let location = location(&user);
    Ok(ApiResponse::created(user, location))
}

/// GET /api/users/:id
pub async fn get(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> ApiResult<User> {
    let id = validate_id(&id)?;
    let user = state.users.find_by_id(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(ApiResponse::success(user))
}
