//! In-memory content store

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::store::collection::PostCollection;
use crate::store::types::{NewPost, Post, PostUpdate};
use crate::store::PostStore;

/// Process-local store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: RwLock<PostCollection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert(&self, post: NewPost) -> StoreResult<Post> {
        Ok(self.posts.write().await.insert(post))
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
        self.posts.write().await.update(id, changes)
    }

    async fn delete(&self, id: &str) -> StoreResult<Post> {
        self.posts.write().await.delete(id)
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.posts.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::error::StoreError;

    #[tokio::test]
    async fn test_crud_cycle() {
        let store = MemoryStore::new();
        let post = assert_ok!(store.insert(NewPost::new("Title", "Body", None)).await);

        let fetched = assert_ok!(store.get(&post.id).await);
        assert_eq!(fetched, post);

        let updated = assert_ok!(
            store
                .update(
                    &post.id,
                    PostUpdate {
                        content: Some("New body".into()),
                        ..Default::default()
                    },
                )
                .await
        );
        assert_eq!(updated.title, "Title");
        assert_eq!(updated.content, "New body");

        assert_ok!(store.delete(&post.id).await);
        let err = assert_err!(store.get(&post.id).await);
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(assert_ok!(store.count().await), 0);
    }

    #[tokio::test]
    async fn test_concurrent_updates_to_same_post() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let post = assert_ok!(store.insert(NewPost::new("Title", "Body", None)).await);

        let handles: Vec<_> = ["one", "two", "three"]
            .into_iter()
            .map(|author| {
                let store = store.clone();
                let id = post.id.clone();
                tokio::spawn(async move {
                    store
                        .update(
                            &id,
                            PostUpdate {
                                author: Some(author.to_string()),
                                ..Default::default()
                            },
                        )
                        .await
                })
            })
            .collect();
        for handle in handles {
            assert_ok!(assert_ok!(handle.await));
        }

        let stored = assert_ok!(store.get(&post.id).await);
        assert!(["one", "two", "three"].contains(&stored.author.as_str()));
        assert!(stored.updated_at > stored.created_at);
    }
}
