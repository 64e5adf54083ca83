//! MCP Tool definitions and handlers

use std::path::PathBuf;
use std::time::Duration;

use file_tools::{
    check_integrity, locate_file, protect_pdf, resolve_path, snapshot, ProtectRequest,
    SnapshotRequest,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::protocol::{Tool, ToolResultContent};
use super::server::FileManagerServer;
use crate::error::ServerError;

/// Get all tool definitions
pub fn get_tool_definitions() -> Vec<Tool> {
    vec![
        Tool {
            name: "web_to_pdf".to_string(),
            description: Some(
                "Saves a PDF snapshot of a web page under the user's home directory".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "Fully qualified URL of the page, including the scheme (https://...)"
                    },
                    "file_name": {
                        "type": "string",
                        "description": "Output file name. Defaults to {domain}_snapshot_{MMDDYYYY}.pdf"
                    },
                    "dir_name": {
                        "type": "string",
                        "default": "/Downloads",
                        "description": "Existing directory under the home directory, starting with /"
                    }
                },
                "required": ["url"]
            }),
        },
        Tool {
            name: "get_file_path".to_string(),
            description: Some(
                "Finds the full path of the first file under the home directory matching a name. \
                 Supports wildcards: * matches any run of characters, ? matches exactly one"
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_name": {
                        "type": "string",
                        "description": "File name to search for, e.g. test_*.pdf or report_?"
                    },
                    "extension": {
                        "type": "string",
                        "description": "File extension including the dot, e.g. .pdf, .txt, .docx"
                    }
                },
                "required": ["file_name"]
            }),
        },
        Tool {
            name: "password_protect_pdf".to_string(),
            description: Some("Encrypts a PDF with a password".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "input_path": {
                        "type": "string",
                        "description": "PDF to protect, absolute or relative to the home directory"
                    },
                    "password": {
                        "type": "string",
                        "description": "Password required to open the protected PDF"
                    },
                    "output_path": {
                        "type": "string",
                        "description": "Where to write the protected PDF. Defaults to input_path (in place)"
                    }
                },
                "required": ["input_path", "password"]
            }),
        },
        Tool {
            name: "check_file_integrity".to_string(),
            description: Some(
                "Checks that a file exists, is readable and non-empty, and that its extension \
                 agrees with its MIME type"
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "File to check, absolute or relative to the home directory"
                    }
                },
                "required": ["file_path"]
            }),
        },
    ]
}

#[derive(Debug, Deserialize)]
struct LocateArgs {
    file_name: String,
    #[serde(default)]
    extension: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IntegrityArgs {
    file_path: String,
}

/// Handle a tool call, bounded by the server's timeout
pub async fn handle_tool_call(
    server: &FileManagerServer,
    name: &str,
    arguments: serde_json::Value,
) -> Result<Vec<ToolResultContent>, ServerError> {
    tracing::info!("Tool call: {}", name);

    let timeout_ms = server.timeout_ms();
    tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        dispatch(server, name, arguments),
    )
    .await
    .map_err(|_| ServerError::Timeout(timeout_ms))?
}

async fn dispatch(
    server: &FileManagerServer,
    name: &str,
    arguments: serde_json::Value,
) -> Result<Vec<ToolResultContent>, ServerError> {
    match name {
        "web_to_pdf" => handle_web_to_pdf(server, arguments).await,
        "get_file_path" => handle_get_file_path(server, arguments).await,
        "password_protect_pdf" => handle_password_protect_pdf(server, arguments).await,
        "check_file_integrity" => handle_check_file_integrity(server, arguments).await,
        _ => Err(ServerError::UnknownTool(name.to_string())),
    }
}

fn parse_args<T: DeserializeOwned>(args: serde_json::Value) -> Result<T, ServerError> {
    serde_json::from_value(args).map_err(|e| ServerError::InvalidArgument(e.to_string()))
}

/// Run a blocking filesystem tool off the async runtime
async fn run_blocking<T, F>(f: F) -> Result<T, ServerError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::TaskFailed(e.to_string()))
}

fn text(text: String) -> Vec<ToolResultContent> {
    vec![ToolResultContent::Text { text }]
}

async fn handle_web_to_pdf(
    server: &FileManagerServer,
    args: serde_json::Value,
) -> Result<Vec<ToolResultContent>, ServerError> {
    let request: SnapshotRequest = parse_args(args)?;
    let message = snapshot(server.home(), server.renderer(), &request).await?;
    Ok(text(message))
}

async fn handle_get_file_path(
    server: &FileManagerServer,
    args: serde_json::Value,
) -> Result<Vec<ToolResultContent>, ServerError> {
    let LocateArgs {
        file_name,
        extension,
    } = parse_args(args)?;
    let home = server.home().to_path_buf();

    let found = run_blocking(move || locate_file(&home, &file_name, extension.as_deref())).await??;

    // Not found is an empty path, not an error
    let path = found
        .map(|p: PathBuf| p.display().to_string())
        .unwrap_or_default();
    Ok(text(path))
}

async fn handle_password_protect_pdf(
    server: &FileManagerServer,
    args: serde_json::Value,
) -> Result<Vec<ToolResultContent>, ServerError> {
    let request: ProtectRequest = parse_args(args)?;
    let home = server.home().to_path_buf();

    let message = run_blocking(move || protect_pdf(&home, &request)).await??;
    Ok(text(message))
}

async fn handle_check_file_integrity(
    server: &FileManagerServer,
    args: serde_json::Value,
) -> Result<Vec<ToolResultContent>, ServerError> {
    let IntegrityArgs { file_path } = parse_args(args)?;
    let path = resolve_path(server.home(), file_path);

    let report = run_blocking(move || check_integrity(&path)).await?;
    Ok(text(serde_json::to_string_pretty(&report)?))
}
