//! Capability catalogs
//!
//! Tool and prompt descriptors are fixed when the registry is built. Resource
//! descriptors are projected from the store on every listing.

use std::sync::Arc;

use tracing::warn;

use crate::config::cms::RESOURCE_MIME_TYPE;
use crate::mcp::prompts::prompt_definitions;
use crate::mcp::tools::tool_definitions;
use crate::mcp::types::{Prompt, Resource, Tool};
use crate::mcp::uri;
use crate::store::{Post, PostStore};

/// Per-kind capability catalogs
pub struct CapabilityRegistry {
    store: Arc<dyn PostStore>,
    tools: Vec<Tool>,
    prompts: Vec<Prompt>,
}

impl CapabilityRegistry {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self {
            store,
            tools: tool_definitions(),
            prompts: prompt_definitions(),
        }
    }

    pub fn list_tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn list_prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    /// One resource per post, in store order. A failing store yields an empty list.
    pub async fn list_resources(&self) -> Vec<Resource> {
        match self.store.all().await {
            Ok(posts) => posts.iter().map(resource_descriptor).collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list resources");
                Vec::new()
            }
        }
    }
}

fn resource_descriptor(post: &Post) -> Resource {
    Resource {
        uri: uri::encode(&post.id),
        name: post.title.clone(),
        description: Some(format!("Post: {} by {}", post.title, post.author)),
        mime_type: Some(RESOURCE_MIME_TYPE.to_string()),
    }
}
