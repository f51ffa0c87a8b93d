use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HasherError {
    #[error("password hashing failed: {0}")]
    Hash(password_hash::Error),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(password_hash::Error),

    #[error("hashing task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Argon2id with a random salt per hash and fixed cost parameters.
///
/// From async code use the `*_blocking` variants, which run on tokio's
/// blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    fn argon2() -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
    }

    /// PHC string (`$argon2id$v=19$...`) for `plaintext`
    pub fn hash(&self, plaintext: &str) -> Result<String, HasherError> {
        let salt = SaltString::generate(&mut OsRng);
        Self::argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(HasherError::Hash)
    }

    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HasherError> {
        let parsed = PasswordHash::new(hash).map_err(HasherError::MalformedHash)?;
        match Self::argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(HasherError::Hash(err)),
        }
    }

    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, HasherError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext)).await?
    }

    pub async fn verify_blocking(&self, plaintext: String, hash: String) -> Result<bool, HasherError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash)).await?
    }
}
