//! Domain entities, use-case services, and the ports they depend on.
//!
//! Types are immutable after construction and validated up front. Services
//! return `Result<T, Error>` for every fallible operation; the HTTP layer
//! maps `Error` onto the canonical response envelope.

pub mod auth_service;
pub mod error;
pub mod password;
pub mod ports;
pub mod product;
pub mod product_service;
pub mod seed;
pub mod token;
pub mod user;

pub use self::auth_service::{AuthService, LoginOutcome};
pub use self::error::{Error, ErrorCode, ErrorStatus};
pub use self::product::{NewProduct, Product, ProductValidationError};
pub use self::product_service::ProductService;
pub use self::seed::{BootstrapSeed, SeedOutcome, SeedRunner};
pub use self::token::{TokenCodec, TokenError};
pub use self::user::{Credentials, Email, Identity, NewSignup, Role, User, UserValidationError};
