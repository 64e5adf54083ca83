//! Standard I/O transport for MCP
//!
//! This module implements the stdio transport for the MCP server,
//! allowing communication via standard input/output streams.
//!
//! Two framings are accepted: one JSON message per line, or LSP-style
//! `Content-Length` headers. Each response uses the framing of the request
//! it answers.
//!
//! IMPORTANT: All logging MUST go to stderr. stdout is reserved for
//! JSON-RPC protocol messages only.

use std::io::{BufRead, Write};

use serde_json::Value;

use crate::error::ServerError;
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, INVALID_REQUEST, PARSE_ERROR};
use crate::mcp::FileManagerServer;

/// How a message was delimited on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// One JSON document per line
    Line,
    /// `Content-Length: N` header block followed by N bytes of JSON
    ContentLength,
}

/// Run the MCP server using stdio transport
pub async fn run_stdio_server(server: FileManagerServer) -> Result<(), ServerError> {
    tracing::info!("Starting stdio transport");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();

    serve(&server, &mut stdin.lock(), &mut stdout.lock()).await
}

/// Serve requests from `reader` until EOF, writing responses to `writer`
pub async fn serve<R: BufRead, W: Write>(
    server: &FileManagerServer,
    reader: &mut R,
    writer: &mut W,
) -> Result<(), ServerError> {
    loop {
        // Read one framed message
        let (body, framing) = match read_frame(reader) {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::info!("EOF reached, shutting down");
                break;
            }
            Err(e) => {
                tracing::error!("Failed to read message: {}", e);
                continue;
            }
        };

        let response = match parse_request(&body) {
            Ok(request) => {
                tracing::debug!("Received request: {:?}", request.method);
                match server.handle_request(request).await {
                    Some(response) => response,
                    None => continue,
                }
            }
            Err(response) => {
                tracing::error!("Rejected malformed message");
                response
            }
        };

        // Write response
        if let Err(e) = write_message(writer, &response, framing) {
            tracing::error!("Failed to write response: {}", e);
        }
    }

    Ok(())
}

/// Decode a message body, or build the JSON-RPC error that answers it.
///
/// Bytes that are not JSON get `-32700`; JSON that is not a request gets
/// `-32600`. Both carry a `null` id.
fn parse_request(body: &[u8]) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        JsonRpcResponse::error(Some(Value::Null), PARSE_ERROR, format!("Parse error: {}", e))
    })?;
    serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::error(
            Some(Value::Null),
            INVALID_REQUEST,
            format!("Invalid request: {}", e),
        )
    })
}

/// Read one message body from the input stream
///
/// Blank lines between messages are skipped. Returns `None` at EOF.
fn read_frame<R: BufRead>(reader: &mut R) -> Result<Option<(Vec<u8>, Framing)>, ServerError> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None); // EOF
        }
        if !line.trim().is_empty() {
            break;
        }
    }

    let line = line.trim();
    let Some(length) = line.strip_prefix("Content-Length:") else {
        return Ok(Some((line.as_bytes().to_vec(), Framing::Line)));
    };

    let content_length: usize = length
        .trim()
        .parse()
        .map_err(|_| ServerError::ProtocolError("Invalid Content-Length".to_string()))?;

    // Skip any further headers up to the empty separator line
    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header)? == 0 {
            return Err(ServerError::ProtocolError(
                "EOF inside message headers".to_string(),
            ));
        }
        if header.trim().is_empty() {
            break;
        }
    }

    // Read body
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;
    Ok(Some((body, Framing::ContentLength)))
}

/// Write a JSON-RPC message to the output stream
fn write_message<W: Write>(
    writer: &mut W,
    response: &JsonRpcResponse,
    framing: Framing,
) -> Result<(), ServerError> {
    let body = serde_json::to_string(response)?;

    match framing {
        Framing::Line => {
            writer.write_all(body.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        Framing::ContentLength => {
            let header = format!("Content-Length: {}\r\n\r\n", body.len());
            writer.write_all(header.as_bytes())?;
            writer.write_all(body.as_bytes())?;
        }
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_read_content_length_message() {
        let input = "Content-Length: 52\r\n\r\n{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":1,\"params\":{}}";
        let mut reader = input.as_bytes();

        let (body, framing) = read_frame(&mut reader).unwrap().unwrap();
        assert_eq!(parse_request(&body).unwrap().method, "ping");
        assert_eq!(framing, Framing::ContentLength);
    }

    #[test]
    fn test_read_line_message() {
        let input = "\n{\"jsonrpc\":\"2.0\",\"method\":\"tools/list\",\"id\":2}\n";
        let mut reader = input.as_bytes();

        let (body, framing) = read_frame(&mut reader).unwrap().unwrap();
        assert_eq!(parse_request(&body).unwrap().method, "tools/list");
        assert_eq!(framing, Framing::Line);
        assert!(read_frame(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_read_invalid_content_length() {
        let mut reader = "Content-Length: many\r\n\r\n{}".as_bytes();
        assert!(matches!(
            read_frame(&mut reader),
            Err(ServerError::ProtocolError(_))
        ));
    }

    #[test]
    fn test_write_message_framings() {
        let response = JsonRpcResponse::success(Some(json!(1)), json!({"result": "ok"}));

        let mut output = Vec::new();
        write_message(&mut output, &response, Framing::ContentLength).unwrap();
        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.starts_with("Content-Length:"));
        assert!(output_str.contains("result"));

        let mut output = Vec::new();
        write_message(&mut output, &response, Framing::Line).unwrap();
        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.starts_with('{'));
        assert!(output_str.ends_with("}\n"));
    }

    #[tokio::test]
    async fn test_serve_session() {
        let home = TempDir::new().unwrap();
        let server = FileManagerServer::new(home.path());

        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":{}}\n",
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
            "not json\n",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n",
        );
        let mut reader = input.as_bytes();
        let mut output = Vec::new();

        serve(&server, &mut reader, &mut output).await.unwrap();

        let responses: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "file-manager");
        assert_eq!(responses[1]["error"]["code"], PARSE_ERROR);
        assert!(responses[1]["id"].is_null());
        assert_eq!(responses[2]["id"], 2);
    }

    #[test]
    fn test_non_request_json_is_invalid_request() {
        let response = parse_request(br#"{"jsonrpc":"2.0","id":4}"#).unwrap_err();
        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_REQUEST);
        assert_eq!(response.id, Some(Value::Null));
    }

    #[tokio::test]
    async fn test_null_id_is_answered() {
        let home = TempDir::new().unwrap();
        let server = FileManagerServer::new(home.path());

        let mut reader = "{\"jsonrpc\":\"2.0\",\"id\":null,\"method\":\"ping\"}\n".as_bytes();
        let mut output = Vec::new();
        serve(&server, &mut reader, &mut output).await.unwrap();

        let response: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert!(response["id"].is_null());
        assert!(response["result"].is_object());
    }
}
