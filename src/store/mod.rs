//! Content store module
//!
//! Defines the store contract the protocol layer depends on, plus the
//! in-memory and JSON-file adapters that implement it.

pub mod collection;
pub mod file;
pub mod memory;
pub mod seed;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StoreBackend};
use crate::error::StoreResult;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use types::{NewPost, Post, PostSummary, PostUpdate};

/// CRUD over posts keyed by a store-generated id.
///
/// Every operation on a single id is atomic with respect to other operations
/// on the same store.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a post and return it with its assigned id and timestamps
    async fn insert(&self, post: NewPost) -> StoreResult<Post>;

    /// All posts in store order
    async fn all(&self) -> StoreResult<Vec<Post>>;

    /// Up to `limit` posts, newest `created_at` first
    async fn recent(&self, limit: usize) -> StoreResult<Vec<Post>>;

    async fn get(&self, id: &str) -> StoreResult<Post>;

    /// Apply the present fields of `changes` and refresh `updated_at`
    async fn update(&self, id: &str, changes: PostUpdate) -> StoreResult<Post>;

    /// Remove a post, returning what was removed
    async fn delete(&self, id: &str) -> StoreResult<Post>;

    async fn count(&self) -> StoreResult<usize>;
}

/// Open the store adapter selected by the configuration
pub async fn open(config: &Config) -> StoreResult<Arc<dyn PostStore>> {
    match config.backend {
        StoreBackend::File => Ok(Arc::new(JsonFileStore::open(&config.store_path).await?)),
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_backend() {
        let config = Config::with_data_dir("/nonexistent/cms").in_memory();
        let store = open(&config).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_open_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());
        let store = open(&config).await.unwrap();
        store.insert(NewPost::new("T", "C", None)).await.unwrap();
        assert!(config.store_path.exists());
    }
}
