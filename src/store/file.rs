//! JSON file content store
//!
//! The whole collection lives in memory and is written back to disk after
//! every mutation. Writes go to a sibling temporary file which is then renamed
//! over the target, and happen while the write lock is held so concurrent
//! mutations reach the disk in the order they were applied.
//!
//! A mutation is applied to a copy of the collection and only replaces the
//! live collection once the copy is on disk, so a failed write changes nothing.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::store::collection::PostCollection;
use crate::store::types::{NewPost, Post, PostUpdate};
use crate::store::PostStore;

/// File-backed store
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    posts: RwLock<PostCollection>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let posts = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => PostCollection::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PostCollection::new(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), posts = posts.len(), "Opened post store");

        Ok(Self {
            path,
            posts: RwLock::new(posts),
        })
    }

    async fn persist(&self, posts: &PostCollection) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(posts)
            .map_err(|e| StoreError::unavailable(format!("failed to serialize posts: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), bytes = json.len(), "Persisted post store");
        Ok(())
    }
}

#[async_trait]
impl PostStore for JsonFileStore {
    async fn insert(&self, post: NewPost) -> StoreResult<Post> {
        let mut posts = self.posts.write().await;
        let mut next = posts.clone();
        let post = next.insert(post);
        self.persist(&next).await?;
        *posts = next;
        Ok(post)
    }

    async fn all(&self) -> StoreResult<Vec<Post>> {
        Ok(self.posts.read().await.all())
    }

    async fn recent(&self, limit: usize) -> StoreResult<Vec<Post>> {
        Ok(self.posts.read().await.recent(limit))
    }

    async fn get(&self, id: &str) -> StoreResult<Post> {
        self.posts.read().await.get(id)
    }

    async fn update(&self, id: &str, changes: PostUpdate) -> StoreResult<Post> {
        let mut posts = self.posts.write().await;
        let mut next = posts.clone();
        let post = next.update(id, changes)?;
        self.persist(&next).await?;
        *posts = next;
        Ok(post)
    }

    async fn delete(&self, id: &str) -> StoreResult<Post> {
        let mut posts = self.posts.write().await;
        let mut next = posts.clone();
        let post = next.delete(id)?;
        self.persist(&next).await?;
        *posts = next;
        Ok(post)
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.posts.read().await.len())
    }
}
