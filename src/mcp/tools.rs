//! MCP Tool definitions and handlers
//!
//! A call goes through three steps: the arguments are checked against the
//! tool's argument table and parsed into a [`ToolCall`], the call is executed
//! against the store, and the outcome is wrapped in an [`Envelope`].
//!
//! Unknown tools and bad arguments fail the request (`McpError`). Anything
//! that goes wrong while executing (missing post, store trouble) is reported
//! inside a `success: false` envelope instead.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use validator::Validate;

use crate::config::cms::DEFAULT_LIST_LIMIT;
use crate::error::{McpError, StoreError, ValidationError};
use crate::mcp::types::{CallToolResult, Tool};
use crate::store::{NewPost, PostStore, PostUpdate};

/// JSON type a tool argument must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgKind {
    String,
    Number,
}

impl ArgKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            ArgKind::String => value.is_string(),
            ArgKind::Number => value.is_number(),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            ArgKind::String => "expected a string",
            ArgKind::Number => "expected a number",
        }
    }
}

/// Enforced argument contract of one tool
struct ToolArgs {
    name: &'static str,
    required: &'static [(&'static str, ArgKind)],
    optional: &'static [(&'static str, ArgKind)],
}

const TOOL_ARGS: &[ToolArgs] = &[
    ToolArgs {
        name: "create_post",
        required: &[("title", ArgKind::String), ("content", ArgKind::String)],
        optional: &[("author", ArgKind::String)],
    },
    ToolArgs {
        name: "list_posts",
        required: &[],
        optional: &[("limit", ArgKind::Number)],
    },
    ToolArgs {
        name: "get_post",
        required: &[("id", ArgKind::String)],
        optional: &[],
    },
    ToolArgs {
        name: "update_post",
        required: &[("id", ArgKind::String)],
        optional: &[
            ("title", ArgKind::String),
            ("content", ArgKind::String),
            ("author", ArgKind::String),
        ],
    },
    ToolArgs {
        name: "delete_post",
        required: &[("id", ArgKind::String)],
        optional: &[],
    },
];

/// Check an argument bag against a tool's table.
///
/// Absent or null arguments count as an empty object; null values count as
/// absent. Arguments outside the table are ignored.
fn validate_arguments(table: &ToolArgs, args: Value) -> Result<Map<String, Value>, ValidationError> {
    let mut args = match args {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        _ => return Err(ValidationError::NotAnObject),
    };
    args.retain(|_, v| !v.is_null());

    for (name, kind) in table.required {
        let value = args.get(*name).ok_or_else(|| ValidationError::MissingField {
            field: name.to_string(),
        })?;
        check_kind(name, *kind, value)?;
    }

    for (name, kind) in table.optional {
        if let Some(value) = args.get(*name) {
            check_kind(name, *kind, value)?;
        }
    }

    Ok(args)
}

fn check_kind(name: &str, kind: ArgKind, value: &Value) -> Result<(), ValidationError> {
    if kind.matches(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidParameter {
            name: name.to_string(),
            message: kind.expected().to_string(),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
struct CreateArgs {
    #[validate(length(min = 1, message = "title must not be empty"))]
    title: String,
    content: String,
    author: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
struct ListArgs {
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    limit: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
struct IdArgs {
    #[validate(length(min = 1, message = "id must not be empty"))]
    id: String,
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateArgs {
    #[validate(length(min = 1, message = "id must not be empty"))]
    id: String,
    #[validate(length(min = 1, message = "title must not be empty"))]
    title: Option<String>,
    content: Option<String>,
    author: Option<String>,
}

/// A validated tool invocation
#[derive(Debug)]
enum ToolCall {
    Create(CreateArgs),
    List(ListArgs),
    Get(IdArgs),
    Update(UpdateArgs),
    Delete(IdArgs),
}

impl ToolCall {
    fn parse(name: &str, args: Value) -> Result<Self, McpError> {
        let table = TOOL_ARGS
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| McpError::UnknownTool {
                name: name.to_string(),
            })?;
        let args = Value::Object(validate_arguments(table, args)?);

        let call = match table.name {
            "create_post" => ToolCall::Create(typed(args)?),
            "list_posts" => ToolCall::List(typed(args)?),
            "get_post" => ToolCall::Get(typed(args)?),
            "update_post" => ToolCall::Update(typed(args)?),
            "delete_post" => ToolCall::Delete(typed(args)?),
            _ => {
                return Err(McpError::UnknownTool {
                    name: name.to_string(),
                })
            }
        };
        Ok(call)
    }
}

fn typed<T>(args: Value) -> Result<T, ValidationError>
where
    T: for<'de> Deserialize<'de> + Validate,
{
    let parsed: T =
        serde_json::from_value(args).map_err(|e| ValidationError::Constraint(e.to_string()))?;
    parsed.validate()?;
    Ok(parsed)
}

/// Soft failure of an executed tool call
#[derive(Debug)]
enum ToolFailure {
    NotFound(String),
    Store(String),
}

impl From<StoreError> for ToolFailure {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ToolFailure::NotFound(err.to_string()),
            other => ToolFailure::Store(other.to_string()),
        }
    }
}

/// The `{success, ...}` wrapper every tool returns
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Envelope {
    fn ok(payload: Map<String, Value>) -> Self {
        Self {
            success: true,
            error: None,
            payload,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            payload: Map::new(),
        }
    }
}

/// Tool handler
pub struct ToolHandler {
    store: Arc<dyn PostStore>,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    /// Call a tool by name.
    ///
    /// Returns `Err` only for unknown tools and invalid arguments; in that
    /// case the store has not been touched.
    pub async fn call_tool(&self, name: &str, args: Value) -> Result<CallToolResult, McpError> {
        let call = ToolCall::parse(name, args)?;

        let (envelope, is_error) = match self.execute(call).await {
            Ok(payload) => (Envelope::ok(payload), false),
            Err(ToolFailure::NotFound(message)) => {
                warn!(tool = name, %message, "Tool target not found");
                (Envelope::failed(message), false)
            }
            Err(ToolFailure::Store(message)) => {
                warn!(tool = name, %message, "Tool execution failed");
                (Envelope::failed(message), true)
            }
        };

        let text = serde_json::to_string(&envelope).map_err(|e| McpError::ProtocolError {
            message: e.to_string(),
        })?;
        Ok(CallToolResult::text(text).with_error_flag(is_error))
    }

    // ==================== Tool Handlers ====================

    async fn execute(&self, call: ToolCall) -> Result<Map<String, Value>, ToolFailure> {
        match call {
            ToolCall::Create(args) => self.handle_create(args).await,
            ToolCall::List(args) => self.handle_list(args).await,
            ToolCall::Get(args) => self.handle_get(args).await,
            ToolCall::Update(args) => self.handle_update(args).await,
            ToolCall::Delete(args) => self.handle_delete(args).await,
        }
    }

    async fn handle_create(&self, args: CreateArgs) -> Result<Map<String, Value>, ToolFailure> {
        let post = self
            .store
            .insert(NewPost::new(args.title, args.content, args.author))
            .await?;
        info!(id = %post.id, "Post created");

        Ok(payload(json!({
            "id": post.id,
            "message": "Post created successfully",
        })))
    }

    async fn handle_list(&self, args: ListArgs) -> Result<Map<String, Value>, ToolFailure> {
        let limit = args
            .limit
            .map_or(DEFAULT_LIST_LIMIT, |l| usize::try_from(l).unwrap_or(usize::MAX));
        let posts = self.store.recent(limit).await?;
        info!(count = posts.len(), "Listing posts");

        let summaries: Vec<_> = posts.iter().map(|p| p.summary()).collect();
        Ok(payload(json!({
            "count": summaries.len(),
            "posts": summaries,
        })))
    }

    async fn handle_get(&self, args: IdArgs) -> Result<Map<String, Value>, ToolFailure> {
        let post = self.store.get(&args.id).await?;
        info!(id = %post.id, "Post fetched");

        Ok(payload(json!({ "post": post })))
    }

    async fn handle_update(&self, args: UpdateArgs) -> Result<Map<String, Value>, ToolFailure> {
        let changes = PostUpdate {
            title: args.title,
            content: args.content,
            author: args.author,
        };
        let post = self.store.update(&args.id, changes).await?;
        info!(id = %post.id, "Post updated");

        Ok(payload(json!({
            "message": "Post updated successfully",
            "post": post,
        })))
    }

    async fn handle_delete(&self, args: IdArgs) -> Result<Map<String, Value>, ToolFailure> {
        let post = self.store.delete(&args.id).await?;
        info!(id = %post.id, "Post deleted");

        Ok(payload(json!({
            "id": post.id,
            "message": "Post deleted successfully",
        })))
    }
}

fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ==================== Tool Definitions ====================

fn tool_def(name: &str, description: &str, schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: schema,
    }
}

/// Descriptors of every tool, in catalog order
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        tool_def("create_post", "Creates a new post in the CMS", create_post_schema()),
        tool_def("list_posts", "Lists posts in the CMS, newest first", list_posts_schema()),
        tool_def("get_post", "Gets a single post by ID", get_post_schema()),
        tool_def("update_post", "Updates an existing post", update_post_schema()),
        tool_def("delete_post", "Deletes a post by ID", delete_post_schema()),
    ]
}

fn create_post_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": {
                "type": "string",
                "description": "Post title"
            },
            "content": {
                "type": "string",
                "description": "Post content"
            },
            "author": {
                "type": "string",
                "description": "Post author (optional, defaults to Anonymous)"
            }
        },
        "required": ["title", "content"]
    })
}

fn list_posts_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "limit": {
                "type": "number",
                "description": "Maximum number of posts to return (default: 10)"
            }
        }
    })
}

fn get_post_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": {
                "type": "string",
                "description": "Post ID"
            }
        },
        "required": ["id"]
    })
}

fn update_post_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": {
                "type": "string",
                "description": "ID of the post to update"
            },
            "title": {
                "type": "string",
                "description": "New title (optional)"
            },
            "content": {
                "type": "string",
                "description": "New content (optional)"
            },
            "author": {
                "type": "string",
                "description": "New author (optional)"
            }
        },
        "required": ["id"]
    })
}

fn delete_post_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": {
                "type": "string",
                "description": "ID of the post to delete"
            }
        },
        "required": ["id"]
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::store::MemoryStore;

    fn handler() -> (ToolHandler, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (ToolHandler::new(store.clone()), store)
    }

    fn envelope(result: &CallToolResult) -> Value {
        serde_json::from_str(result.content[0].as_text()).unwrap()
    }

    async fn call(handler: &ToolHandler, name: &str, args: Value) -> Value {
        let result = handler.call_tool(name, args).await.unwrap();
        envelope(&result)
    }

    #[test]
    fn test_catalog_matches_argument_table() {
        let names: Vec<_> = tool_definitions().into_iter().map(|t| t.name).collect();
        let table: Vec<_> = TOOL_ARGS.iter().map(|t| t.name.to_string()).collect();
        assert_eq!(names, table);
    }

    #[test]
    fn test_validate_missing_required() {
        let err = validate_arguments(&TOOL_ARGS[0], json!({"title": "T"})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                field: "content".into()
            }
        );
    }

    #[test]
    fn test_validate_wrong_kind() {
        let err = validate_arguments(&TOOL_ARGS[1], json!({"limit": "5"})).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidParameter { name, .. } if name == "limit"));

        let err = validate_arguments(&TOOL_ARGS[2], json!({"id": 42})).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidParameter { name, .. } if name == "id"));
    }

    #[test]
    fn test_validate_null_and_non_object() {
        assert!(validate_arguments(&TOOL_ARGS[1], Value::Null).unwrap().is_empty());
        assert_eq!(
            validate_arguments(&TOOL_ARGS[1], json!([1, 2])).unwrap_err(),
            ValidationError::NotAnObject
        );
        let args = validate_arguments(&TOOL_ARGS[3], json!({"id": "x", "title": null})).unwrap();
        assert!(!args.contains_key("title"));
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (handler, _) = handler();
        let created = call(&handler, "create_post", json!({"title": "T", "content": "C"})).await;
        assert_eq!(created["success"], true);
        let id = created["id"].as_str().unwrap().to_string();

        let fetched = call(&handler, "get_post", json!({"id": id})).await;
        assert_eq!(fetched["success"], true);
        assert_eq!(fetched["post"]["title"], "T");
        assert_eq!(fetched["post"]["content"], "C");
        assert_eq!(fetched["post"]["author"], "Anonymous");
        assert_eq!(fetched["post"]["createdAt"], fetched["post"]["updatedAt"]);
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let (handler, store) = handler();
        let post = store
            .insert(NewPost::new("Old", "Body", Some("Ana".into())))
            .await
            .unwrap();

        let updated = call(&handler, "update_post", json!({"id": post.id, "title": "New"})).await;
        assert_eq!(updated["success"], true);

        let stored = store.get(&post.id).await.unwrap();
        assert_eq!(stored.title, "New");
        assert_eq!(stored.content, "Body");
        assert_eq!(stored.author, "Ana");
        assert!(stored.updated_at > stored.created_at);
    }

    #[tokio::test]
    async fn test_missing_post_is_soft_failure() {
        let (handler, _) = handler();
        for name in ["get_post", "update_post", "delete_post"] {
            let result = handler.call_tool(name, json!({"id": "missing"})).await.unwrap();
            assert!(!result.is_error);
            let body = envelope(&result);
            assert_eq!(body["success"], false);
            assert!(body["error"].as_str().unwrap().contains("missing"));
        }
    }

    #[tokio::test]
    async fn test_list_order_and_limit() {
        let (handler, store) = handler();
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        for (i, title) in ["A", "B", "C"].iter().enumerate() {
            store
                .insert(NewPost::new(*title, "body", None).created_at(base + Duration::hours(i as i64)))
                .await
                .unwrap();
        }

        let listed = call(&handler, "list_posts", json!({})).await;
        assert_eq!(listed["count"], 3);
        let titles: Vec<_> = listed["posts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
        assert!(listed["posts"][0].get("content").is_none());

        let limited = call(&handler, "list_posts", json!({"limit": 2})).await;
        assert_eq!(limited["count"], 2);
        assert_eq!(limited["posts"][0]["title"], "C");
        assert_eq!(limited["posts"][1]["title"], "B");
    }

    #[tokio::test]
    async fn test_hard_failures() {
        let (handler, store) = handler();

        let err = handler.call_tool("frobnicate", json!({})).await.unwrap_err();
        assert!(matches!(err, McpError::UnknownTool { .. }));

        let err = handler
            .call_tool("create_post", json!({"title": "T"}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            McpError::InvalidArguments(ValidationError::MissingField { .. })
        ));

        let err = handler
            .call_tool("create_post", json!({"title": "", "content": "C"}))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::InvalidArguments(ValidationError::Constraint(_))));

        let err = handler.call_tool("list_posts", json!({"limit": 0})).await.unwrap_err();
        assert!(matches!(err, McpError::InvalidArguments(_)));

        assert_eq!(store.count().await.unwrap(), 0);
    }
}
