//! Product route group. Both routes require a bearer token.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Error, NewProduct};

use super::envelope::{success, success_with_message};
use super::identity::AuthenticatedIdentity;
use super::state::HttpState;
use super::validation::{FieldRule, Rule, RuleSet};

static CREATE_RULES: RuleSet = RuleSet {
    name: "products.create",
    rules: &[
        FieldRule {
            field: "name",
            rule: Rule::Required,
            message: "name is required",
        },
        FieldRule {
            field: "priceCents",
            rule: Rule::Required,
            message: "priceCents is required",
        },
    ],
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProductRequest {
    name: String,
    #[serde(default)]
    description: String,
    price_cents: i64,
}

/// Mounts the product route group under the supplied scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::post().to(create))
        .route("/", web::get().to(list));
}

async fn create(
    _identity: AuthenticatedIdentity,
    state: web::Data<HttpState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, Error> {
    RuleSet::apply_all(&[&CREATE_RULES], &body)?;
    let request: CreateProductRequest = serde_json::from_value(body.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let new_product = NewProduct::new(request.name, request.description, request.price_cents)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let product = state.products.create(new_product).await?;
    Ok(success_with_message(product, "product created"))
}

async fn list(
    _identity: AuthenticatedIdentity,
    state: web::Data<HttpState>,
) -> Result<HttpResponse, Error> {
    let products = state.products.list().await?;
    Ok(success(products))
}
