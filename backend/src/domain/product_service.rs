//! Product catalogue use-cases.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::error::Error;
use super::ports::{Notification, NotificationBus, PersistenceError, ProductRepository};
use super::product::{NewProduct, Product};

fn map_persistence_error(error: PersistenceError) -> Error {
    match error {
        PersistenceError::Connection { message } => Error::service_unavailable(message),
        PersistenceError::Duplicate { field } => {
            Error::conflict(format!("{field} already exists"))
        }
        PersistenceError::Query { message } => Error::internal(message),
    }
}

/// Catalogue service over the product repository and the notification bus.
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    notifications: Arc<dyn NotificationBus>,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        notifications: Arc<dyn NotificationBus>,
    ) -> Self {
        Self {
            products,
            notifications,
        }
    }

    /// Persist a new product and announce it to socket subscribers.
    pub async fn create(&self, new_product: NewProduct) -> Result<Product, Error> {
        let product = Product {
            id: Uuid::new_v4(),
            name: new_product.name().to_owned(),
            description: new_product.description().to_owned(),
            price_cents: new_product.price_cents(),
            created_at: Utc::now(),
        };

        self.products
            .insert(&product)
            .await
            .map_err(map_persistence_error)?;

        if let Err(err) = self
            .notifications
            .publish(Notification::new(
                "product.created",
                json!({ "id": product.id, "name": product.name }),
            ))
            .await
        {
            warn!(error = %err, product = %product.id, "product.created notification failed");
        }

        Ok(product)
    }

    pub async fn list(&self) -> Result<Vec<Product>, Error> {
        self.products.list().await.map_err(map_persistence_error)
    }
}
