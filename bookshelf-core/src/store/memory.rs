//! In-memory book store

use super::{BookStore, Collection, StoreResult};
use crate::types::{Book, BookDraft, BookUpdate};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Book store that lives only as long as the process (for testing)
#[derive(Default)]
pub struct MemoryBookStore {
    collection: RwLock<Collection>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, draft: BookDraft) -> StoreResult<Option<Book>> {
        self.collection.write().await.insert(draft).map(Some)
    }

    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        Ok(self.collection.read().await.all())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        self.collection.read().await.get(id)
    }

    async fn update_by_id(&self, id: &str, update: BookUpdate) -> StoreResult<Option<Book>> {
        self.collection.write().await.update(id, update)
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        self.collection.write().await.remove(id)
    }
}
