use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::parse_stored_id;
use crate::database::document::{timestamp_now, Document};
use crate::database::object_id::ObjectId;
use crate::database::repository::{Repository, StoreError};
use crate::models::{Folder, NameDraft, SearchFilter, Tag};

/// A document that is nothing but a unique `name`, stored in `TABLE`
pub trait NamedDocument: Document<Draft = NameDraft, Changes = NameDraft, Filter = SearchFilter> {
    const TABLE: &'static str;

    fn from_parts(id: ObjectId, name: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self;

    fn name(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;
}

impl NamedDocument for Folder {
    const TABLE: &'static str = "folders";

    fn from_parts(id: ObjectId, name: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Folder { id, name, created_at, updated_at }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl NamedDocument for Tag {
    const TABLE: &'static str = "tags";

    fn from_parts(id: ObjectId, name: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Tag { id, name, created_at, updated_at }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, FromRow)]
struct NamedRow {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NamedRow {
    fn into_document<D: NamedDocument>(self) -> Result<D, StoreError> {
        let id = parse_stored_id(&self.id)?;
        Ok(D::from_parts(id, self.name, self.created_at, self.updated_at))
    }
}

const COLUMNS: &str = "id, name, created_at, updated_at";

/// Repository for the `folders` and `tags` tables
pub struct PgNamedRepository<D> {
    pool: PgPool,
    _phantom: PhantomData<fn() -> D>,
}

impl<D: NamedDocument> PgNamedRepository<D> {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, _phantom: PhantomData }
    }
}

#[async_trait]
impl<D: NamedDocument> Repository<D> for PgNamedRepository<D> {
    async fn list(&self, filter: &D::Filter) -> Result<Vec<D>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} \
             WHERE ($1::text IS NULL OR strpos(name, $1) > 0) \
             ORDER BY name, id",
            D::TABLE
        );
        let rows = sqlx::query_as::<_, NamedRow>(&sql)
            .bind(filter.search_term.as_deref())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(NamedRow::into_document::<D>).collect()
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<D>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", D::TABLE);
        let row = sqlx::query_as::<_, NamedRow>(&sql)
            .bind(id.to_hex())
            .fetch_optional(&self.pool)
            .await?;
        row.map(NamedRow::into_document::<D>).transpose()
    }

    async fn create(&self, draft: D::Draft) -> Result<D, StoreError> {
        let sql = format!(
            "INSERT INTO {} (id, name, created_at, updated_at) VALUES ($1, $2, $3, $3) RETURNING {COLUMNS}",
            D::TABLE
        );
        let row = sqlx::query_as::<_, NamedRow>(&sql)
            .bind(ObjectId::new().to_hex())
            .bind(&draft.name)
            .bind(timestamp_now())
            .fetch_one(&self.pool)
            .await?;
        row.into_document()
    }

    async fn update_by_id(&self, id: &ObjectId, changes: D::Changes) -> Result<Option<D>, StoreError> {
        let sql = format!(
            "UPDATE {} SET name = $2, \
             updated_at = GREATEST($3::timestamptz, updated_at + INTERVAL '1 millisecond') \
             WHERE id = $1 RETURNING {COLUMNS}",
            D::TABLE
        );
        let row = sqlx::query_as::<_, NamedRow>(&sql)
            .bind(id.to_hex())
            .bind(&changes.name)
            .bind(timestamp_now())
            .fetch_optional(&self.pool)
            .await?;
        row.map(NamedRow::into_document::<D>).transpose()
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", D::TABLE);
        let result = sqlx::query(&sql).bind(id.to_hex()).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn name_taken(&self, key: &str, except: Option<&ObjectId>) -> Result<bool, StoreError> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE name = $1 AND ($2::text IS NULL OR id <> $2))",
            D::TABLE
        );
        let taken = sqlx::query_scalar::<_, bool>(&sql)
            .bind(key)
            .bind(except.map(ObjectId::to_hex))
            .fetch_one(&self.pool)
            .await?;
        Ok(taken)
    }

    async fn insert_many(&self, docs: Vec<D>) -> Result<usize, StoreError> {
        let sql = format!(
            "INSERT INTO {} (id, name, created_at, updated_at) VALUES ($1, $2, $3, $4)",
            D::TABLE
        );
        let mut tx = self.pool.begin().await?;
        for doc in &docs {
            sqlx::query(&sql)
                .bind(doc.id().to_hex())
                .bind(doc.name())
                .bind(doc.created_at())
                .bind(doc.updated_at())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(docs.len())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {}", D::TABLE);
        let result = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
