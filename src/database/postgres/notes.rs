use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::parse_stored_id;
use crate::database::document::timestamp_now;
use crate::database::object_id::ObjectId;
use crate::database::repository::{Repository, StoreError};
use crate::models::{Note, NoteChanges, NoteDraft, NoteFilter};

#[derive(Debug, FromRow)]
struct NoteRow {
    id: String,
    title: String,
    content: String,
    folder_id: Option<String>,
    tag_ids: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<NoteRow> for Note {
    type Error = StoreError;

    fn try_from(row: NoteRow) -> Result<Self, Self::Error> {
        Ok(Note {
            id: parse_stored_id(&row.id)?,
            title: row.title,
            content: row.content,
            folder_id: row.folder_id.as_deref().map(parse_stored_id).transpose()?,
            tag_ids: row
                .tag_ids
                .iter()
                .map(|raw| parse_stored_id(raw))
                .collect::<Result<_, _>>()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn hex_ids(ids: &[ObjectId]) -> Vec<String> {
    ids.iter().map(ObjectId::to_hex).collect()
}

const COLUMNS: &str = "id, title, content, folder_id, tag_ids, created_at, updated_at";

pub struct PgNoteRepository {
    pool: PgPool,
}

impl PgNoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Note> for PgNoteRepository {
    async fn list(&self, filter: &NoteFilter) -> Result<Vec<Note>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM notes \
             WHERE ($1::text IS NULL OR strpos(title, $1) > 0 OR strpos(content, $1) > 0) \
             AND ($2::text IS NULL OR folder_id = $2) \
             AND ($3::text IS NULL OR $3 = ANY(tag_ids)) \
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(filter.search_term.as_deref())
            .bind(filter.folder_id.as_ref().map(ObjectId::to_hex))
            .bind(filter.tag_id.as_ref().map(ObjectId::to_hex))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Note::try_from).collect()
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Note>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM notes WHERE id = $1");
        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(id.to_hex())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Note::try_from).transpose()
    }

    async fn create(&self, draft: NoteDraft) -> Result<Note, StoreError> {
        let sql = format!(
            "INSERT INTO notes (id, title, content, folder_id, tag_ids, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(ObjectId::new().to_hex())
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(draft.folder_id.as_ref().map(ObjectId::to_hex))
            .bind(hex_ids(&draft.tag_ids))
            .bind(timestamp_now())
            .fetch_one(&self.pool)
            .await?;
        Note::try_from(row)
    }

    async fn update_by_id(&self, id: &ObjectId, changes: NoteChanges) -> Result<Option<Note>, StoreError> {
        // $4 says whether folder_id is being set at all, since $5 = NULL is a
        // legitimate value (remove from folder)
        let sql = format!(
            "UPDATE notes SET \
             title = $2, \
             content = COALESCE($3::text, content), \
             folder_id = CASE WHEN $4::boolean THEN $5::text ELSE folder_id END, \
             tag_ids = COALESCE($6::text[], tag_ids), \
             updated_at = GREATEST($7::timestamptz, updated_at + INTERVAL '1 millisecond') \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let (set_folder, folder_id) = match &changes.folder_id {
            Some(folder) => (true, folder.as_ref().map(ObjectId::to_hex)),
            None => (false, None),
        };
        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(id.to_hex())
            .bind(&changes.title)
            .bind(changes.content.as_deref())
            .bind(set_folder)
            .bind(folder_id)
            .bind(changes.tag_ids.as_deref().map(hex_ids))
            .bind(timestamp_now())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Note::try_from).transpose()
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id.to_hex())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_many(&self, docs: Vec<Note>) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        for note in &docs {
            sqlx::query(
                "INSERT INTO notes (id, title, content, folder_id, tag_ids, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(note.id.to_hex())
            .bind(&note.title)
            .bind(&note.content)
            .bind(note.folder_id.as_ref().map(ObjectId::to_hex))
            .bind(hex_ids(&note.tag_ids))
            .bind(note.created_at)
            .bind(note.updated_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(docs.len())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM notes").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
