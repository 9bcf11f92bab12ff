//! Shared state injected into HTTP handlers.

use std::sync::Arc;

use crate::domain::{AuthService, ProductService, TokenCodec};

/// Application services the HTTP layer depends on, registered once as
/// `web::Data<HttpState>` when routes are mounted.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<AuthService>,
    pub products: Arc<ProductService>,
    pub tokens: TokenCodec,
}

impl HttpState {
    pub fn new(auth: Arc<AuthService>, products: Arc<ProductService>, tokens: TokenCodec) -> Self {
        Self {
            auth,
            products,
            tokens,
        }
    }
}
