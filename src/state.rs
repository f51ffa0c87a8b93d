use std::sync::Arc;

use crate::database::postgres::{PgNamedRepository, PgNoteRepository, PgUserRepository};
use crate::database::{Database, DatabaseError, MemoryRepository, Repository, UserRepository};
use crate::hasher::PasswordHasher;
use crate::models::{Folder, Note, Tag, User};

/// Shared handler state: one repository per collection plus the pool
/// behind them, when there is one.
#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<dyn Repository<Note>>,
    pub folders: Arc<dyn Repository<Folder>>,
    pub tags: Arc<dyn Repository<Tag>>,
    pub users: Arc<dyn UserRepository>,
    pub hasher: PasswordHasher,
    pub database: Option<Database>,
}

impl AppState {
    /// Everything in process memory; lost on exit
    pub fn in_memory() -> Self {
        Self {
            notes: Arc::new(MemoryRepository::<Note>::new()),
            folders: Arc::new(MemoryRepository::<Folder>::new()),
            tags: Arc::new(MemoryRepository::<Tag>::new()),
            users: Arc::new(MemoryRepository::<User>::new()),
            hasher: PasswordHasher,
            database: None,
        }
    }

    pub fn postgres(database: Database) -> Self {
        let pool = database.pool().clone();
        Self {
            notes: Arc::new(PgNoteRepository::new(pool.clone())),
            folders: Arc::new(PgNamedRepository::<Folder>::new(pool.clone())),
            tags: Arc::new(PgNamedRepository::<Tag>::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool)),
            hasher: PasswordHasher,
            database: Some(database),
        }
    }

    /// Reachability of the backing store. The in-memory store is always up.
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        match &self.database {
            Some(database) => database.health_check().await,
            None => Ok(()),
        }
    }

    pub fn store_name(&self) -> &'static str {
        if self.database.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }
}
