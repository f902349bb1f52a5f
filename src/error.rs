//! Error types for the CMS MCP Server
//!
//! Store errors, argument validation errors and protocol errors are kept
//! apart: protocol errors abort a request, store errors are reported to the
//! agent inside the tool envelope.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the CMS MCP Server
#[derive(Error, Debug)]
pub enum CmsMcpError {
    /// Content store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Content store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Post not found: {id}")]
    NotFound { id: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Store file is corrupt: {path}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::unavailable(err.to_string())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found: {path}")]
    DirNotFound { path: String },

    #[error("Failed to create data directory: {path}")]
    DirCreationFailed { path: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Argument validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid parameter: {name} - {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Arguments must be an object")]
    NotAnObject,

    #[error("{0}")]
    Constraint(String),
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reasons = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}: {}", field, reasons)
            })
            .collect();
        fields.sort();
        ValidationError::Constraint(fields.join("; "))
    }
}

/// MCP protocol errors. Each one fails the request it belongs to.
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Unknown prompt: {name}")]
    UnknownPrompt { name: String },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(#[from] ValidationError),

    #[error("Malformed resource URI: {uri}")]
    MalformedLocator { uri: String },

    #[error("Resource not found: {uri}")]
    ResourceNotFound { uri: String },

    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Protocol error: {message}")]
    ProtocolError { message: String },

    #[error("Transport error: {message}")]
    TransportError { message: String },
}

impl McpError {
    /// JSON-RPC error code reported to the client
    pub fn code(&self) -> i32 {
        match self {
            McpError::UnknownTool { .. }
            | McpError::UnknownPrompt { .. }
            | McpError::InvalidArguments(_)
            | McpError::MalformedLocator { .. } => -32602,
            McpError::ResourceNotFound { .. } => -32002,
            McpError::ProtocolError { .. } => -32600,
            McpError::StoreUnavailable { .. } | McpError::TransportError { .. } => -32603,
        }
    }
}

/// Result type alias for CMS MCP operations
pub type Result<T> = std::result::Result<T, CmsMcpError>;

/// Result type alias for content store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound {
            id: "abc123".to_string(),
        };
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn test_error_conversion() {
        let store_err = StoreError::unavailable("connection reset");
        let err: CmsMcpError = store_err.into();
        assert!(matches!(err, CmsMcpError::Store(StoreError::Unavailable { .. })));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(McpError::UnknownTool { name: "x".into() }.code(), -32602);
        assert_eq!(
            McpError::InvalidArguments(ValidationError::NotAnObject).code(),
            -32602
        );
        assert_eq!(McpError::ResourceNotFound { uri: "post://x".into() }.code(), -32002);
        assert_eq!(McpError::StoreUnavailable { message: "down".into() }.code(), -32603);
    }

    #[test]
    fn test_io_error_becomes_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io.into();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }
}
