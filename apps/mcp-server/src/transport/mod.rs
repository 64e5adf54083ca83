//! Transports carrying JSON-RPC messages to and from the server

#[cfg(feature = "http")]
pub mod http;
pub mod stdio;
