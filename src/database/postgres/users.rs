use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::parse_stored_id;
use crate::database::document::timestamp_now;
use crate::database::object_id::ObjectId;
use crate::database::repository::{Repository, StoreError, UserRepository};
use crate::models::{SearchFilter, User, UserChanges, UserDraft};

#[derive(FromRow)]
struct UserRow {
    id: String,
    name: Option<String>,
    username: String,
    password: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_stored_id(&row.id)?,
            name: row.name,
            username: row.username,
            password: row.password,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, name, username, password, created_at, updated_at";

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<User> for PgUserRepository {
    async fn list(&self, filter: &SearchFilter) -> Result<Vec<User>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE ($1::text IS NULL OR strpos(username, $1) > 0) \
             ORDER BY username"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(filter.search_term.as_deref())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.to_hex())
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn create(&self, draft: UserDraft) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (id, name, username, password, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(ObjectId::new().to_hex())
            .bind(draft.name.as_deref())
            .bind(&draft.username)
            .bind(&draft.password)
            .bind(timestamp_now())
            .fetch_one(&self.pool)
            .await?;
        User::try_from(row)
    }

    async fn update_by_id(&self, id: &ObjectId, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET \
             name = COALESCE($2::text, name), \
             password = COALESCE($3::text, password), \
             updated_at = GREATEST($4::timestamptz, updated_at + INTERVAL '1 millisecond') \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.to_hex())
            .bind(changes.name.as_deref())
            .bind(changes.password.as_deref())
            .bind(timestamp_now())
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.to_hex())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn name_taken(&self, key: &str, except: Option<&ObjectId>) -> Result<bool, StoreError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 AND ($2::text IS NULL OR id <> $2))",
        )
        .bind(key)
        .bind(except.map(ObjectId::to_hex))
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn insert_many(&self, docs: Vec<User>) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        for user in &docs {
            sqlx::query(
                "INSERT INTO users (id, name, username, password, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(user.id.to_hex())
            .bind(user.name.as_deref())
            .bind(&user.username)
            .bind(&user.password)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(docs.len())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }
}
