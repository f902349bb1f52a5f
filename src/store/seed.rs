//! Sample posts for populating an empty store

use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

use crate::error::StoreResult;
use crate::store::types::{NewPost, Post};
use crate::store::PostStore;

struct SamplePost {
    title: &'static str,
    author: &'static str,
    created_at: (i32, u32, u32, u32, u32),
    content: &'static str,
}

const SAMPLE_POSTS: &[SamplePost] = &[
    SamplePost {
        title: "Introduction to TypeScript",
        author: "Antonio Mambo",
        created_at: (2025, 11, 1, 10, 0),
        content: "TypeScript adds static types to JavaScript.\n\n\
## Main benefits\n\
- Errors caught while developing\n\
- Better autocomplete\n\
- Safer refactoring\n\
- Types as living documentation\n\n\
```typescript\n\
interface User {\n  id: number;\n  name: string;\n}\n\n\
function greet(user: User): string {\n  return `Hello, ${user.name}!`;\n}\n\
```",
    },
    SamplePost {
        title: "A Complete Guide to Document Databases",
        author: "Maria Silva",
        created_at: (2025, 11, 2, 14, 30),
        content: "Document databases store records as JSON-like documents.\n\n\
## Characteristics\n\
- Flexible schema\n\
- Horizontal scaling\n\
- Rich queries\n\n\
## CRUD\n\
- **Create**: insert one or many documents\n\
- **Read**: find by filter or by id\n\
- **Update**: set fields on matching documents\n\
- **Delete**: remove matching documents",
    },
    SamplePost {
        title: "The Model Context Protocol Explained",
        author: "João Santos",
        created_at: (2025, 11, 3, 9, 15),
        content: "MCP lets language models talk to external systems in a standard way.\n\n\
## Building blocks\n\
1. **Tools**: operations the model can invoke\n\
2. **Resources**: content the model can read\n\
3. **Prompts**: reusable instruction templates\n\n\
A CMS server exposes posts as resources and CRUD operations as tools.",
    },
    SamplePost {
        title: "Async/Await in Practice",
        author: "Pedro Costa",
        created_at: (2025, 11, 4, 16, 45),
        content: "Async functions let I/O-bound code read sequentially.\n\n\
## Guidelines\n\
- Await independent work concurrently\n\
- Propagate errors instead of swallowing them\n\
- Never block the executor thread\n\
- Keep critical sections short",
    },
    SamplePost {
        title: "REST API Best Practices",
        author: "Ana Oliveira",
        created_at: (2025, 11, 5, 11, 20),
        content: "Well designed REST APIs are predictable.\n\n\
## Endpoints\n\
```\n\
GET    /api/posts       list posts\n\
GET    /api/posts/:id   fetch a post\n\
POST   /api/posts       create a post\n\
PUT    /api/posts/:id   update a post\n\
DELETE /api/posts/:id   delete a post\n\
```\n\n\
## Status codes\n\
- 200 OK\n\
- 201 Created\n\
- 400 Bad Request\n\
- 404 Not Found\n\
- 500 Internal Server Error",
    },
];

fn timestamp((year, month, day, hour, minute): (i32, u32, u32, u32, u32)) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Sample post requests in creation order
pub fn sample_posts() -> Vec<NewPost> {
    SAMPLE_POSTS
        .iter()
        .map(|s| {
            NewPost::new(s.title, s.content, Some(s.author.to_string()))
                .created_at(timestamp(s.created_at))
        })
        .collect()
}

/// Insert every sample post and return the stored posts
pub async fn seed(store: &dyn PostStore) -> StoreResult<Vec<Post>> {
    let mut inserted = Vec::with_capacity(SAMPLE_POSTS.len());
    for post in sample_posts() {
        let post = store.insert(post).await?;
        info!(id = %post.id, title = %post.title, "Seeded post");
        inserted.push(post);
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_seed_inserts_all_samples() {
        let store = MemoryStore::new();
        let posts = seed(&store).await.unwrap();

        assert_eq!(posts.len(), SAMPLE_POSTS.len());
        assert_eq!(store.count().await.unwrap(), SAMPLE_POSTS.len());
        assert!(posts.iter().all(|p| p.author != "Anonymous"));
    }

    #[tokio::test]
    async fn test_seeded_posts_keep_their_dates() {
        let store = MemoryStore::new();
        seed(&store).await.unwrap();

        let newest = store.recent(1).await.unwrap();
        assert_eq!(newest[0].title, "REST API Best Practices");
        assert_eq!(newest[0].created_at, newest[0].updated_at);
    }
}
