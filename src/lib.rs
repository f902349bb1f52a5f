//! CMS MCP Server Library
//!
//! A Model Context Protocol (MCP) server for a small content management
//! system. Posts can be created, listed, read, updated and deleted through
//! tools, read as `post://` resources, and a few writing prompts are provided.

pub mod config;
pub mod error;
pub mod mcp;
pub mod store;

pub use config::Config;
pub use error::{CmsMcpError, Result};
