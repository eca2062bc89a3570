//! Application state

use crate::config::{Config, StoreKind};
use anyhow::{Context, Result};
use bookshelf_core::store::{BookStore, JsonFileBookStore, MemoryBookStore};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Persistence port for books
    pub store: Arc<dyn BookStore>,
}

impl AppState {
    /// Wrap an already constructed store
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Open the store selected by `config`
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn BookStore> = match config.store {
            StoreKind::Memory => {
                tracing::warn!("Using in-memory store, books will not survive a restart");
                Arc::new(MemoryBookStore::new())
            }
            StoreKind::Json => Arc::new(
                JsonFileBookStore::open(&config.data_path)
                    .await
                    .with_context(|| {
                        format!("failed to open book store at {}", config.data_path.display())
                    })?,
            ),
        };
        Ok(Self::new(store))
    }
}
