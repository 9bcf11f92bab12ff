//! Relational persistence adapters built on Diesel and PostgreSQL.

mod diesel_product_repository;
mod diesel_seed_store;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_product_repository::DieselProductRepository;
pub use diesel_seed_store::DieselSeedStore;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
