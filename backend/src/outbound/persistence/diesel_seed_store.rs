//! PostgreSQL-backed seed-run bookkeeping.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, SeedStore};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewSeedRunRow;
use super::pool::DbPool;
use super::schema::seed_runs;

/// Diesel implementation of the seed bookkeeping port. `mark_applied` uses
/// an `ON CONFLICT DO NOTHING` upsert so concurrent first-boots converge.
#[derive(Clone)]
pub struct DieselSeedStore {
    pool: DbPool,
}

impl DieselSeedStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeedStore for DieselSeedStore {
    async fn applied_at(&self, seed_key: &str) -> Result<Option<DateTime<Utc>>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        seed_runs::table
            .filter(seed_runs::seed_key.eq(seed_key))
            .select(seed_runs::applied_at)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "seed_key"))
    }

    async fn mark_applied(&self, seed_key: &str) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(seed_runs::table)
            .values(NewSeedRunRow {
                seed_key,
                applied_at: Utc::now(),
            })
            .on_conflict(seed_runs::seed_key)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "seed_key"))?;
        Ok(())
    }
}
