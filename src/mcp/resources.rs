//! Post resources
//!
//! Listing goes through the capability registry; reading is the only path
//! that returns a post's full content.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::cms::RESOURCE_MIME_TYPE;
use crate::error::{McpError, StoreError};
use crate::mcp::registry::CapabilityRegistry;
use crate::mcp::types::{ReadResourceResult, Resource, ResourceContent};
use crate::mcp::uri;
use crate::store::PostStore;

/// Resolves `post://` locators against the store
pub struct ResourceResolver {
    registry: Arc<CapabilityRegistry>,
    store: Arc<dyn PostStore>,
}

impl ResourceResolver {
    pub fn new(registry: Arc<CapabilityRegistry>, store: Arc<dyn PostStore>) -> Self {
        Self { registry, store }
    }

    pub async fn list_resources(&self) -> Vec<Resource> {
        self.registry.list_resources().await
    }

    /// Read one post as pretty-printed JSON
    pub async fn read_resource(&self, locator: &str) -> Result<ReadResourceResult, McpError> {
        let id = uri::decode(locator)?;

        let post = self.store.get(id).await.map_err(|e| {
            warn!(uri = locator, error = %e, "Failed to read resource");
            match e {
                StoreError::NotFound { .. } => McpError::ResourceNotFound {
                    uri: locator.to_string(),
                },
                other => McpError::StoreUnavailable {
                    message: other.to_string(),
                },
            }
        })?;

        let text = serde_json::to_string_pretty(&post).map_err(|e| McpError::ProtocolError {
            message: e.to_string(),
        })?;
        info!(title = %post.title, "Resource read");

        Ok(ReadResourceResult {
            contents: vec![ResourceContent {
                uri: locator.to_string(),
                mime_type: Some(RESOURCE_MIME_TYPE.to_string()),
                text: Some(text),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::store::{MemoryStore, NewPost};

    fn resolver(store: Arc<MemoryStore>) -> ResourceResolver {
        let registry = Arc::new(CapabilityRegistry::new(store.clone()));
        ResourceResolver::new(registry, store)
    }

    #[tokio::test]
    async fn test_read_returns_full_post() {
        let store = Arc::new(MemoryStore::new());
        let post = store
            .insert(NewPost::new("Title", "Full body", None))
            .await
            .unwrap();

        let result = resolver(store).read_resource(&uri::encode(&post.id)).await.unwrap();
        let content = &result.contents[0];
        assert_eq!(content.uri, format!("post://{}", post.id));
        assert_eq!(content.mime_type.as_deref(), Some("application/json"));

        let body: Value = serde_json::from_str(content.text.as_deref().unwrap()).unwrap();
        assert_eq!(body["id"], post.id.as_str());
        assert_eq!(body["content"], "Full body");
        assert_eq!(body["author"], "Anonymous");
        assert!(body["createdAt"].is_string());
        assert!(body["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn test_read_failures() {
        let resolver = resolver(Arc::new(MemoryStore::new()));

        let err = resolver.read_resource("not-a-uri").await.unwrap_err();
        assert!(matches!(err, McpError::MalformedLocator { .. }));

        let err = resolver.read_resource("post://missing").await.unwrap_err();
        assert!(matches!(err, McpError::ResourceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_listing_omits_content() {
        let store = Arc::new(MemoryStore::new());
        store.insert(NewPost::new("Title", "Secret body", None)).await.unwrap();

        let listed = serde_json::to_string(&resolver(store).list_resources().await).unwrap();
        assert!(!listed.contains("Secret body"));
    }
}
