//! Content store data types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::cms::DEFAULT_AUTHOR;

/// A post as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a stored post from a creation request
    pub(crate) fn from_new(id: String, new: NewPost, now: DateTime<Utc>) -> Self {
        let created_at = new.created_at.unwrap_or(now);
        Self {
            id,
            title: new.title,
            content: new.content,
            author: new.author,
            created_at,
            updated_at: created_at,
        }
    }

    /// Apply a partial update and refresh `updated_at`
    pub(crate) fn apply(&mut self, changes: PostUpdate, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(author) = changes.author {
            self.author = author;
        }
        self.updated_at = next_timestamp(self.updated_at, now);
    }

    /// Listing projection (no content body)
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            created_at: self.created_at,
        }
    }
}

/// `updated_at` must move strictly forward even when the clock has not.
fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Listing projection of a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Creation request
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
    /// Explicit creation time, used when importing existing posts
    pub created_at: Option<DateTime<Utc>>,
}

impl NewPost {
    /// Create a post request; a missing or empty author becomes "Anonymous"
    pub fn new(title: impl Into<String>, content: impl Into<String>, author: Option<String>) -> Self {
        let author = author
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        Self {
            title: title.into(),
            content: content.into(),
            author,
            created_at: None,
        }
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }
}

/// Partial update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_author() {
        assert_eq!(NewPost::new("t", "c", None).author, "Anonymous");
        assert_eq!(NewPost::new("t", "c", Some(String::new())).author, "Anonymous");
        assert_eq!(NewPost::new("t", "c", Some("Ana".into())).author, "Ana");
    }

    #[test]
    fn test_apply_partial_update() {
        let now = Utc::now();
        let mut post = Post::from_new("1".into(), NewPost::new("Old", "Body", None), now);
        post.apply(
            PostUpdate {
                title: Some("New".into()),
                ..Default::default()
            },
            now,
        );

        assert_eq!(post.title, "New");
        assert_eq!(post.content, "Body");
        assert_eq!(post.author, "Anonymous");
        assert!(post.updated_at > post.created_at);
    }

    #[test]
    fn test_serialized_field_names() {
        let post = Post::from_new("1".into(), NewPost::new("T", "C", None), Utc::now());
        let value = serde_json::to_value(&post).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("created_at").is_none());
    }
}
