//! Product aggregate for the catalogue route group.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Validation errors raised while constructing product values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductValidationError {
    #[error("product name must not be empty")]
    EmptyName,
    #[error("price must not be negative")]
    NegativePrice,
}

/// Stored product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Validated request to create a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    name: String,
    description: String,
    price_cents: i64,
}

impl NewProduct {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price_cents: i64,
    ) -> Result<Self, ProductValidationError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        if price_cents < 0 {
            return Err(ProductValidationError::NegativePrice);
        }
        Ok(Self {
            name,
            description: description.into(),
            price_cents,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price_cents(&self) -> i64 {
        self.price_cents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 100, ProductValidationError::EmptyName)]
    #[case("Widget", -1, ProductValidationError::NegativePrice)]
    fn rejects_invalid_input(
        #[case] name: &str,
        #[case] price: i64,
        #[case] expected: ProductValidationError,
    ) {
        let err = NewProduct::new(name, "", price).expect_err("should be rejected");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn accepts_zero_price() {
        assert!(NewProduct::new("Widget", "free sample", 0).is_ok());
    }
}
