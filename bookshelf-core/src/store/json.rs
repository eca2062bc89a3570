//! Book store persisted to a JSON file

use super::{BookStore, Collection, StoreResult};
use crate::types::{Book, BookDraft, BookUpdate};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

const FILE_NAME: &str = "books.json";

/// Document store that writes the whole collection to `books.json` after
/// every change
pub struct JsonFileBookStore {
    path: PathBuf,
    collection: RwLock<Collection>,
}

impl JsonFileBookStore {
    /// Open the store rooted at `dir`, creating the directory if needed
    pub async fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(FILE_NAME);
        let collection = Collection::load(&path).await?;
        tracing::info!(
            "Opened book store at {} ({} books)",
            path.display(),
            collection.len()
        );

        Ok(Self {
            path,
            collection: RwLock::new(collection),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a mutation and persist it, restoring the previous state if the
    /// save fails. Nothing is written when the mutation matched no record.
    async fn mutate(
        &self,
        op: impl FnOnce(&mut Collection) -> StoreResult<Option<Book>>,
    ) -> StoreResult<Option<Book>> {
        let mut collection = self.collection.write().await;
        let snapshot = collection.clone();

        let result = op(&mut *collection)?;
        if result.is_none() {
            return Ok(None);
        }
        if let Err(e) = collection.save(&self.path).await {
            tracing::error!("Failed to save book store, rolling back: {}", e);
            *collection = snapshot;
            return Err(e);
        }
        Ok(result)
    }
}

#[async_trait]
impl BookStore for JsonFileBookStore {
    async fn create(&self, draft: BookDraft) -> StoreResult<Option<Book>> {
        self.mutate(|c| c.insert(draft).map(Some)).await
    }

    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        Ok(self.collection.read().await.all())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        self.collection.read().await.get(id)
    }

    async fn update_by_id(&self, id: &str, update: BookUpdate) -> StoreResult<Option<Book>> {
        self.mutate(|c| c.update(id, update)).await
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        self.mutate(|c| c.remove(id)).await
    }
}
