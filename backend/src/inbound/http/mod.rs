//! Inbound HTTP surface: route groups, request validation, the bearer-token
//! guard, and the canonical response envelope.

pub mod auth;
pub mod envelope;
pub mod error;
pub mod health;
pub mod identity;
pub mod products;
pub mod state;
pub mod validation;

pub use error::json_error_handler;
pub use health::HealthState;
pub use identity::AuthenticatedIdentity;
pub use state::HttpState;
