//! Boilerplate application backend: REST API with token auth, a product
//! module, real-time socket notifications, background task processing over a
//! Redis-backed queue, and PDF generation.
//!
//! The crate is laid out hexagonally: `domain` holds entities, services, and
//! ports; `inbound` holds the HTTP and WebSocket adapters; `outbound` holds
//! the driven adapters; `server` assembles and serves the whole thing.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::{RequestLog, Trace, TraceId};
