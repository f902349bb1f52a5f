//! Ordered post collection shared by the store adapters
//!
//! Posts are kept in insertion order, which is the order `all()` reports.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::types::{NewPost, Post, PostUpdate};

/// In-process post collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostCollection {
    posts: Vec<Post>,
}

impl PostCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, new: NewPost) -> Post {
        let id = Uuid::new_v4().simple().to_string();
        let post = Post::from_new(id, new, Utc::now());
        self.posts.push(post.clone());
        post
    }

    pub fn all(&self) -> Vec<Post> {
        self.posts.clone()
    }

    /// Newest first by `created_at`; equal timestamps keep the later insertion first.
    pub fn recent(&self, limit: usize) -> Vec<Post> {
        let mut posts: Vec<Post> = self.posts.iter().rev().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit);
        posts
    }

    pub fn get(&self, id: &str) -> StoreResult<Post> {
        self.posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    pub fn update(&mut self, id: &str, changes: PostUpdate) -> StoreResult<Post> {
        let post = self
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found(id))?;
        post.apply(changes, Utc::now());
        Ok(post.clone())
    }

    pub fn delete(&mut self, id: &str) -> StoreResult<Post> {
        let index = self
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| not_found(id))?;
        Ok(self.posts.remove(index))
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

fn not_found(id: &str) -> StoreError {
    StoreError::NotFound { id: id.to_string() }
}
