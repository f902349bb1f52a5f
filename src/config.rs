//! Configuration management for the CMS MCP Server
//!
//! Handles the data directory, store selection and environment variables.

use std::path::{Path, PathBuf};

use crate::error::{CmsMcpError, ConfigError, Result};

/// Which content store adapter backs the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// JSON document on disk
    File,
    /// Process-local store, lost on exit
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(CmsMcpError::Config(ConfigError::InvalidConfig {
                message: format!("unknown store backend '{}' (expected 'file' or 'memory')", other),
            })),
        }
    }
}

/// Configuration for the CMS MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the store file
    pub data_dir: PathBuf,

    /// Path to the JSON store file
    pub store_path: PathBuf,

    /// Store adapter to use
    pub backend: StoreBackend,
}

impl Config {
    /// Create a new configuration from the environment
    pub fn new() -> Result<Self> {
        let data_dir = match std::env::var("CMS_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => Self::default_data_dir()?,
        };
        Self::ensure_dir(&data_dir)?;

        let store_path = std::env::var("CMS_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join(cms::STORE_FILE_NAME));

        let backend = match std::env::var("CMS_STORE_BACKEND") {
            Ok(value) => StoreBackend::parse(&value)?,
            Err(_) => StoreBackend::File,
        };

        Ok(Self {
            data_dir,
            store_path,
            backend,
        })
    }

    /// Create a file-backed configuration rooted at an explicit directory
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let store_path = data_dir.join(cms::STORE_FILE_NAME);

        Self {
            data_dir,
            store_path,
            backend: StoreBackend::File,
        }
    }

    /// Override the store file location
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Use the in-memory store instead of the file store
    pub fn in_memory(mut self) -> Self {
        self.backend = StoreBackend::Memory;
        self
    }

    fn default_data_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| {
                CmsMcpError::Config(ConfigError::DirNotFound {
                    path: "~".to_string(),
                })
            })?
            .join(".cms-mcp"))
    }

    fn ensure_dir(dir: &Path) -> Result<()> {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|_| {
                CmsMcpError::Config(ConfigError::DirCreationFailed {
                    path: dir.display().to_string(),
                })
            })?;
        }
        Ok(())
    }
}

/// CMS constants
pub mod cms {
    /// Server name reported on initialize
    pub const SERVER_NAME: &str = "llm-cms-server";

    /// URI scheme of post resources
    pub const RESOURCE_SCHEME: &str = "post";

    /// MIME type of post resources
    pub const RESOURCE_MIME_TYPE: &str = "application/json";

    /// Author recorded when none is given
    pub const DEFAULT_AUTHOR: &str = "Anonymous";

    /// Number of posts returned by `list_posts` without a limit
    pub const DEFAULT_LIST_LIMIT: usize = 10;

    /// File name of the JSON store inside the data directory
    pub const STORE_FILE_NAME: &str = "posts.json";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_data_dir() {
        let config = Config::with_data_dir("/tmp/cms-test");
        assert_eq!(config.store_path, PathBuf::from("/tmp/cms-test/posts.json"));
        assert_eq!(config.backend, StoreBackend::File);
    }

    #[test]
    fn test_overrides() {
        let config = Config::with_data_dir("/tmp/cms-test")
            .store_path("/var/lib/cms/store.json")
            .in_memory();
        assert_eq!(config.store_path, PathBuf::from("/var/lib/cms/store.json"));
        assert_eq!(config.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(StoreBackend::parse("FILE").unwrap(), StoreBackend::File);
        assert_eq!(StoreBackend::parse(" memory ").unwrap(), StoreBackend::Memory);
        assert!(StoreBackend::parse("mongo").is_err());
    }
}
