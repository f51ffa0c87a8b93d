use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::database::{StoreError, UserRepository};
use crate::error::ApiError;
use crate::hasher::PasswordHasher;
use crate::models::{NewUser, User, UserDraft};
use crate::state::AppState;
use crate::validation::{ensure_unique, optional_text, require, validate_password, validate_trimmed};

/// Registration and credential checks on top of the user repository
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.users.clone(), state.hasher)
    }

    /// Validate, hash the password, and store a new user
    pub async fn register(&self, input: NewUser) -> Result<User, ApiError> {
        let username = require("username", input.username)?;
        let password = require("password", input.password)?;
        validate_trimmed("username", &username)?;
        validate_trimmed("password", &password)?;
        validate_password(&password)?;
        let name = optional_text("name", input.name)?
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        ensure_unique::<User, _>(self.users.as_ref(), &username, None, "username").await?;

        let hash = self.hasher.hash_blocking(password).await?;
        let draft = UserDraft {
            name,
            username,
            password: hash,
        };

        let user = self.users.create(draft).await.map_err(|err| match err {
            StoreError::UniqueViolation(_) => {
                warn!("Username taken between check and insert");
                ApiError::duplicate("username")
            }
            other => other.into(),
        })?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// The user, if `username` exists and `password` matches its hash
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>, ApiError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            debug!("No user named {:?}", username);
            return Ok(None);
        };

        let valid = self
            .hasher
            .verify_blocking(password.to_string(), user.password.clone())
            .await?;
        Ok(valid.then_some(user))
    }
}
