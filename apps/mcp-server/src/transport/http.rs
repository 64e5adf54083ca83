//! HTTP transport for MCP
//!
//! This module implements the HTTP transport for the MCP server,
//! allowing communication via JSON-RPC over HTTP POST requests.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::error::ServerError;
use crate::mcp::protocol::JsonRpcRequest;
use crate::mcp::FileManagerServer;

/// Shared state for the HTTP server
#[derive(Clone)]
pub struct HttpServerState {
    /// The MCP server instance
    server: Arc<FileManagerServer>,
}

/// Run the MCP server using HTTP transport
pub async fn run_http_server(addr: &str, server: FileManagerServer) -> Result<(), ServerError> {
    tracing::info!("Starting HTTP transport on {}", addr);

    let state = HttpServerState {
        server: Arc::new(server),
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(ServerError::IoError)?;

    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(state))
        .await
        .map_err(|e| ServerError::IoError(std::io::Error::other(e)))?;

    Ok(())
}

fn router(state: HttpServerState) -> Router {
    // Configure CORS for browser clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // MCP JSON-RPC endpoint
        .route("/mcp", post(handle_mcp_request))
        // Health check
        .route("/health", get(handle_health))
        // Server info
        .route("/", get(handle_info))
        .layer(cors)
        .with_state(state)
}

/// Handle MCP JSON-RPC requests
async fn handle_mcp_request(
    State(state): State<HttpServerState>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    tracing::debug!("HTTP request: {:?}", request.method);

    match state.server.handle_request(request).await {
        Some(response) => Json(response).into_response(),
        // Notifications are acknowledged without a body
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Health check endpoint
async fn handle_health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "file-manager-mcp-server"
    }))
}

/// Server info endpoint
async fn handle_info(State(state): State<HttpServerState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "http",
        "endpoints": {
            "mcp": "/mcp",
            "health": "/health"
        }
    }))
}
