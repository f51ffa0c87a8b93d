use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::document::timestamp_now;
use super::object_id::ObjectId;
use super::repository::StoreError;
use crate::models::{Folder, Note, Tag};
use crate::state::AppState;

const BUNDLED_FOLDERS: &str = include_str!("../../seed/folders.json");
const BUNDLED_TAGS: &str = include_str!("../../seed/tags.json");
const BUNDLED_NOTES: &str = include_str!("../../seed/notes.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed file {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Deserialize)]
struct NamedSeed {
    id: ObjectId,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteSeed {
    id: ObjectId,
    title: String,
    #[serde(default)]
    content: String,
    folder_id: Option<ObjectId>,
    #[serde(default)]
    tag_ids: Vec<ObjectId>,
}

/// Fixed-id fixture set for notes, folders and tags
#[derive(Debug)]
pub struct SeedData {
    folders: Vec<NamedSeed>,
    tags: Vec<NamedSeed>,
    notes: Vec<NoteSeed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub folders: usize,
    pub tags: usize,
    pub notes: usize,
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} folders, {} tags, {} notes", self.folders, self.tags, self.notes)
    }
}

impl SeedData {
    /// The set compiled into the binary from `seed/`
    pub fn bundled() -> Result<Self, SeedError> {
        Ok(Self {
            folders: parse("folders.json", BUNDLED_FOLDERS)?,
            tags: parse("tags.json", BUNDLED_TAGS)?,
            notes: parse("notes.json", BUNDLED_NOTES)?,
        })
    }

    /// Read `folders.json`, `tags.json` and `notes.json` from `dir`
    pub fn from_dir(dir: &Path) -> Result<Self, SeedError> {
        Ok(Self {
            folders: read(dir, "folders.json")?,
            tags: read(dir, "tags.json")?,
            notes: read(dir, "notes.json")?,
        })
    }

    /// Replace every note, folder and tag with this set. Users are untouched.
    pub async fn load(&self, state: &AppState) -> Result<SeedSummary, SeedError> {
        state.notes.delete_all().await?;
        state.folders.delete_all().await?;
        state.tags.delete_all().await?;

        let now = timestamp_now();
        let folders = self
            .folders
            .iter()
            .map(|seed| Folder {
                id: seed.id,
                name: seed.name.clone(),
                created_at: now,
                updated_at: now,
            })
            .collect();
        let tags = self
            .tags
            .iter()
            .map(|seed| Tag {
                id: seed.id,
                name: seed.name.clone(),
                created_at: now,
                updated_at: now,
            })
            .collect();
        let notes = self
            .notes
            .iter()
            .map(|seed| Note {
                id: seed.id,
                title: seed.title.clone(),
                content: seed.content.clone(),
                folder_id: seed.folder_id,
                tag_ids: seed.tag_ids.clone(),
                created_at: now,
                updated_at: now,
            })
            .collect();

        let summary = SeedSummary {
            folders: state.folders.insert_many(folders).await?,
            tags: state.tags.insert_many(tags).await?,
            notes: state.notes.insert_many(notes).await?,
        };
        info!("Seeded {}", summary);
        Ok(summary)
    }
}

fn parse<T: for<'de> Deserialize<'de>>(file: &str, raw: &str) -> Result<Vec<T>, SeedError> {
    serde_json::from_str(raw).map_err(|source| SeedError::Parse {
        file: file.to_string(),
        source,
    })
}

fn read<T: for<'de> Deserialize<'de>>(dir: &Path, file: &str) -> Result<Vec<T>, SeedError> {
    let path = dir.join(file);
    let raw = fs::read_to_string(&path).map_err(|source| SeedError::Io { path, source })?;
    parse(file, &raw)
}
