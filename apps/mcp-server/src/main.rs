//! File Manager MCP Server Binary
//!
//! Entry point for the MCP server supporting multiple transports.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use file_tools::ChromeRenderer;
use mcp_server::{FileManagerServer, ServerError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "file-manager-mcp-server")]
#[command(
    version,
    about = "Local file-management tools via Model Context Protocol"
)]
struct Args {
    /// Transport mode: stdio or http
    #[arg(short, long, default_value = "stdio")]
    transport: String,

    /// HTTP server address (only used with http transport)
    #[arg(long, default_value = "127.0.0.1:3000")]
    http_addr: String,

    /// Tool-call timeout in milliseconds
    #[arg(long, default_value = "120000")]
    timeout_ms: u64,

    /// Directory the tools treat as the user's home (defaults to $HOME)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Chrome/Chromium executable used for web page snapshots
    #[arg(long)]
    chrome_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing - CRITICAL: use stderr for stdio transport
    let use_stderr = args.transport == "stdio";

    if use_stderr {
        // For stdio transport, ALL output must go to stderr
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting File Manager MCP Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Transport: {}", args.transport);

    let home = match args.root {
        Some(root) => root,
        None => dirs::home_dir().ok_or(ServerError::NoHomeDir)?,
    };
    tracing::info!("Home root: {}", home.display());

    let mut renderer = ChromeRenderer::new();
    if let Some(path) = args.chrome_path {
        renderer = renderer.with_executable(path);
    }

    let server = FileManagerServer::new(home)
        .with_timeout(args.timeout_ms)
        .with_renderer(Arc::new(renderer));

    match args.transport.as_str() {
        "stdio" => {
            mcp_server::transport::stdio::run_stdio_server(server).await?;
        }
        #[cfg(feature = "http")]
        "http" => {
            mcp_server::transport::http::run_http_server(&args.http_addr, server).await?;
        }
        #[cfg(not(feature = "http"))]
        "http" => {
            eprintln!("HTTP transport not enabled. Rebuild with --features http");
            std::process::exit(1);
        }
        other => {
            eprintln!("Unknown transport: {}. Use 'stdio' or 'http'", other);
            std::process::exit(1);
        }
    }

    Ok(())
}
