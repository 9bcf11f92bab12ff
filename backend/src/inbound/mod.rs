//! Inbound adapters: the HTTP API and the WebSocket notification stream.

pub mod http;
pub mod ws;
