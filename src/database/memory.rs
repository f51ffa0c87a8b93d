use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::document::{next_updated_at, timestamp_now, Document};
use super::object_id::ObjectId;
use super::repository::{Repository, StoreError, UserRepository};
use crate::models::user::User;

/// In-process store for one collection.
///
/// Each call holds the lock for its whole duration, so the unique-key check
/// and the write it guards are atomic here, unlike in the PostgreSQL store
/// where the unique index does that job.
pub struct MemoryRepository<D: Document> {
    docs: RwLock<BTreeMap<ObjectId, D>>,
}

impl<D: Document> MemoryRepository<D> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
        }
    }

    fn conflicting_key(docs: &BTreeMap<ObjectId, D>, candidate: &D) -> Option<String> {
        let key = candidate.unique_key()?;
        docs.values()
            .any(|doc| doc.id() != candidate.id() && doc.unique_key() == Some(key))
            .then(|| key.to_string())
    }
}

impl<D: Document> Default for MemoryRepository<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<D: Document> Repository<D> for MemoryRepository<D> {
    async fn list(&self, filter: &D::Filter) -> Result<Vec<D>, StoreError> {
        let docs = self.docs.read().await;
        let mut out: Vec<D> = docs.values().filter(|doc| doc.matches(filter)).cloned().collect();
        out.sort_by(D::list_order);
        Ok(out)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<D>, StoreError> {
        Ok(self.docs.read().await.get(id).cloned())
    }

    async fn create(&self, draft: D::Draft) -> Result<D, StoreError> {
        let doc = D::from_draft(ObjectId::new(), draft, timestamp_now());

        let mut docs = self.docs.write().await;
        if let Some(key) = Self::conflicting_key(&docs, &doc) {
            return Err(StoreError::UniqueViolation(key));
        }
        docs.insert(*doc.id(), doc.clone());
        Ok(doc)
    }

    async fn update_by_id(&self, id: &ObjectId, changes: D::Changes) -> Result<Option<D>, StoreError> {
        let mut docs = self.docs.write().await;
        let Some(current) = docs.get(id) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        let stamp = next_updated_at(updated.updated_at(), timestamp_now());
        updated.apply(changes, stamp);

        if let Some(key) = Self::conflicting_key(&docs, &updated) {
            return Err(StoreError::UniqueViolation(key));
        }
        docs.insert(*id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, StoreError> {
        Ok(self.docs.write().await.remove(id).is_some())
    }

    async fn name_taken(&self, key: &str, except: Option<&ObjectId>) -> Result<bool, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs
            .values()
            .any(|doc| doc.unique_key() == Some(key) && Some(doc.id()) != except))
    }

    async fn insert_many(&self, new_docs: Vec<D>) -> Result<usize, StoreError> {
        let mut docs = self.docs.write().await;
        let count = new_docs.len();
        for doc in new_docs {
            if docs.contains_key(doc.id()) {
                return Err(StoreError::UniqueViolation(format!("id {}", doc.id())));
            }
            if let Some(key) = Self::conflicting_key(&docs, &doc) {
                return Err(StoreError::UniqueViolation(key));
            }
            docs.insert(*doc.id(), doc);
        }
        Ok(count)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut docs = self.docs.write().await;
        let removed = docs.len() as u64;
        docs.clear();
        Ok(removed)
    }
}

#[async_trait]
impl UserRepository for MemoryRepository<User> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.values().find(|user| user.username == username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::folder::Folder;
    use crate::models::{NameDraft, SearchFilter};

    fn draft(name: &str) -> NameDraft {
        NameDraft { name: name.to_string() }
    }

    #[tokio::test]
    async fn create_assigns_id_and_matching_timestamps() {
        let repo = MemoryRepository::<Folder>::new();
        let folder = repo.create(draft("Work")).await.unwrap();

        assert_eq!(folder.name, "Work");
        assert_eq!(folder.created_at, folder.updated_at);
        assert_eq!(repo.find_by_id(&folder.id).await.unwrap(), Some(folder));
    }

    #[tokio::test]
    async fn update_keeps_created_at_and_advances_updated_at() {
        let repo = MemoryRepository::<Folder>::new();
        let folder = repo.create(draft("Work")).await.unwrap();

        let updated = repo.update_by_id(&folder.id, draft("Work2")).await.unwrap().unwrap();
        assert_eq!(updated.name, "Work2");
        assert_eq!(updated.created_at, folder.created_at);
        assert!(updated.updated_at > folder.updated_at);
    }

    #[tokio::test]
    async fn update_of_missing_id_is_none() {
        let repo = MemoryRepository::<Folder>::new();
        assert!(repo.update_by_id(&ObjectId::new(), draft("x")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unique_key_is_enforced_on_write() {
        let repo = MemoryRepository::<Folder>::new();
        repo.create(draft("Work")).await.unwrap();
        let other = repo.create(draft("Home")).await.unwrap();

        assert!(matches!(repo.create(draft("Work")).await, Err(StoreError::UniqueViolation(_))));
        assert!(matches!(
            repo.update_by_id(&other.id, draft("Work")).await,
            Err(StoreError::UniqueViolation(_))
        ));
        // Renaming to its own name is not a conflict
        assert!(repo.update_by_id(&other.id, draft("Home")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn name_taken_excludes_the_record_being_updated() {
        let repo = MemoryRepository::<Folder>::new();
        let work = repo.create(draft("Work")).await.unwrap();

        assert!(repo.name_taken("Work", None).await.unwrap());
        assert!(!repo.name_taken("Work", Some(&work.id)).await.unwrap());
        assert!(!repo.name_taken("work", None).await.unwrap());
    }

    #[tokio::test]
    async fn list_sorts_and_filters() {
        let repo = MemoryRepository::<Folder>::new();
        for name in ["Personal", "Archive", "Work"] {
            repo.create(draft(name)).await.unwrap();
        }

        let all = repo.list(&SearchFilter::default()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Archive", "Personal", "Work"]);

        // Case-sensitive: "Archive" does not match "a"
        let filter = SearchFilter { search_term: Some("a".to_string()) };
        let matched = repo.list(&filter).await.unwrap();
        let names: Vec<&str> = matched.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Personal"]);

        let filter = SearchFilter { search_term: Some("or".to_string()) };
        let matched = repo.list(&filter).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Work");
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let repo = MemoryRepository::<Folder>::new();
        let folder = repo.create(draft("Work")).await.unwrap();

        assert!(repo.delete_by_id(&folder.id).await.unwrap());
        assert!(!repo.delete_by_id(&folder.id).await.unwrap());
        assert!(repo.find_by_id(&folder.id).await.unwrap().is_none());
    }
}
