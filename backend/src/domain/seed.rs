//! Idempotent bootstrap seeding.
//!
//! Runs after full assembly. The first run inserts the bootstrap admin
//! account and records the seed key; later runs observe the record and do
//! nothing, so seeding twice leaves the same data set as seeding once. A
//! duplicate-email insert is also treated as already-seeded, covering a
//! seed that was applied but whose run record was lost.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::password::{hash_password, PasswordHashError};
use super::ports::{PersistenceError, SeedStore, UserRepository};
use super::user::{Email, Role, User, UserValidationError};

/// Result of a seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Seed data was inserted by this run.
    Applied,
    /// A previous run already applied this seed key.
    AlreadySeeded,
}

/// Errors surfaced while seeding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeedError {
    #[error("seed admin account is invalid: {0}")]
    InvalidAdmin(#[from] UserValidationError),
    #[error(transparent)]
    Password(#[from] PasswordHashError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Bootstrap data applied on first startup.
#[derive(Debug, Clone)]
pub struct BootstrapSeed {
    pub seed_key: String,
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
}

/// Applies the bootstrap seed exactly once per seed key.
pub struct SeedRunner {
    users: Arc<dyn UserRepository>,
    store: Arc<dyn SeedStore>,
}

impl SeedRunner {
    pub fn new(users: Arc<dyn UserRepository>, store: Arc<dyn SeedStore>) -> Self {
        Self { users, store }
    }

    pub async fn run(&self, seed: &BootstrapSeed) -> Result<SeedOutcome, SeedError> {
        if let Some(applied_at) = self.store.applied_at(&seed.seed_key).await? {
            info!(seed_key = %seed.seed_key, %applied_at, "seed already applied; skipping");
            return Ok(SeedOutcome::AlreadySeeded);
        }

        let admin = User {
            id: Uuid::new_v4(),
            name: seed.admin_name.clone(),
            email: Email::new(&seed.admin_email)?,
            role: Role::Admin,
            password_hash: hash_password(&seed.admin_password)?,
            created_at: Utc::now(),
        };

        match self.users.insert(&admin).await {
            Ok(()) => {}
            Err(PersistenceError::Duplicate { .. }) => {
                info!(seed_key = %seed.seed_key, "seed admin already present; recording run");
            }
            Err(other) => return Err(other.into()),
        }

        self.store.mark_applied(&seed.seed_key).await?;
        info!(seed_key = %seed.seed_key, "seed applied");
        Ok(SeedOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MemorySeedStore, MemoryUserRepository};
    use rstest::rstest;

    fn seed() -> BootstrapSeed {
        BootstrapSeed {
            seed_key: "bootstrap-v1".into(),
            admin_name: "Admin".into(),
            admin_email: "admin@example.com".into(),
            admin_password: "change-me-please".into(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn seeding_twice_equals_seeding_once() {
        let users = Arc::new(MemoryUserRepository::new());
        let runner = SeedRunner::new(users.clone(), Arc::new(MemorySeedStore::new()));

        let first = runner.run(&seed()).await.expect("first run");
        assert_eq!(first, SeedOutcome::Applied);
        assert_eq!(users.len(), 1);

        let second = runner.run(&seed()).await.expect("second run");
        assert_eq!(second, SeedOutcome::AlreadySeeded);
        assert_eq!(users.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn lost_run_record_with_existing_admin_still_converges() {
        let users = Arc::new(MemoryUserRepository::new());
        let runner = SeedRunner::new(users.clone(), Arc::new(MemorySeedStore::new()));
        runner.run(&seed()).await.expect("first run");

        // Fresh store simulates a lost seed-run record.
        let runner = SeedRunner::new(users.clone(), Arc::new(MemorySeedStore::new()));
        let outcome = runner.run(&seed()).await.expect("re-run");
        assert_eq!(outcome, SeedOutcome::Applied);
        assert_eq!(users.len(), 1);
    }
}
