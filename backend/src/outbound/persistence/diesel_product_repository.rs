//! PostgreSQL-backed product repository.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, ProductRepository};
use crate::domain::Product;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewProductRow, ProductRow};
use super::pool::DbPool;
use super::schema::products;

/// Diesel implementation of the product persistence port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn insert(&self, product: &Product) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(products::table)
            .values(NewProductRow::from(product))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "id"))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProductRow> = products::table
            .order(products::created_at.asc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "id"))?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}
