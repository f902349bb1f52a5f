//! CMS MCP Server - Rust Implementation
//!
//! A Model Context Protocol (MCP) server exposing a post store to LLM agents.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use cms_mcp_server::config::Config;
use cms_mcp_server::mcp::server::McpServer;
use cms_mcp_server::store::{self, seed};

/// CMS MCP Server
#[derive(Parser)]
#[command(name = "cms-mcp-server")]
#[command(author, version, about = "CMS MCP Server - A Model Context Protocol server for blog posts")]
struct Cli {
    /// Path of the JSON store file
    #[arg(long, global = true)]
    store_path: Option<PathBuf>,

    /// Keep posts in memory only
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Populate the store with sample posts
    Seed,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries protocol messages
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::new().context("failed to load configuration")?;
    if let Some(path) = cli.store_path {
        config = config.store_path(path);
    }
    if cli.in_memory {
        config = config.in_memory();
    }

    let store = store::open(&config)
        .await
        .with_context(|| format!("failed to open store at {}", config.store_path.display()))?;

    match cli.command {
        Some(Commands::Seed) => {
            let before = store.count().await?;
            let posts = seed::seed(store.as_ref()).await.context("failed to seed store")?;
            let after = store.count().await?;

            eprintln!("Posts before seeding: {}", before);
            for (i, post) in posts.iter().enumerate() {
                eprintln!("{}. {} (ID: {}, author: {})", i + 1, post.title, post.id, post.author);
            }
            eprintln!("Posts after seeding: {}", after);
        }
        None => {
            info!(
                version = env!("CARGO_PKG_VERSION"),
                store = ?config.backend,
                "Starting CMS MCP server"
            );
            let server = Arc::new(McpServer::new(store));
            server.run_stdio().await?;
            info!("Server shut down");
        }
    }

    Ok(())
}
