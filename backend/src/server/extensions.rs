//! Application assembler: binds every extension before anything serves.
//!
//! Assembly is fail-fast: a missing mandatory setting or an unreachable
//! mandatory backend aborts startup with a descriptive error instead of
//! leaving a half-wired process running. Optional backends (relational
//! store, document store, mail) fall back to their in-memory or no-op
//! adapters with a log line stating the substitution; once configured,
//! each backend is contacted at bind time, so an unreachable URL aborts
//! startup instead of deferring the failure to the first use.

use std::sync::Arc;

use apalis_redis::RedisStorage;
use thiserror::Error;
use tracing::info;

use crate::config::{AppSettings, ConfigError, HookName};
use crate::domain::ports::{
    AuditTrail, Mailer, MemoryProductRepository, MemorySeedStore, MemoryUserRepository,
    NoopAuditTrail, NoopMailer, ProductRepository, SeedStore, UserRepository, WelcomeEmailJob,
};
use crate::domain::{
    AuthService, BootstrapSeed, ProductService, SeedOutcome, SeedRunner, TokenCodec,
};
use crate::domain::seed::SeedError;
use crate::inbound::ws::WsState;
use crate::outbound::cache::{BrokerError, RedisBroker};
use crate::outbound::documents::{DocumentStoreError, MongoAuditTrail};
use crate::outbound::mail::{MailSetupError, SmtpMailer};
use crate::outbound::persistence::{
    DbPool, DieselProductRepository, DieselSeedStore, DieselUserRepository, PoolConfig, PoolError,
};
use crate::outbound::queue::{connect_queue, QueueError, RedisTaskDispatcher};

/// Which subsystems the process binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupMode {
    /// Serve the HTTP API and the WebSocket stream; push queue jobs.
    Serve,
    /// Consume queue jobs; no HTTP listener.
    Worker,
}

/// Errors that abort assembly.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Broker(#[from] BrokerError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Database(#[from] PoolError),
    #[error(transparent)]
    DocumentStore(#[from] DocumentStoreError),
    #[error(transparent)]
    Mail(#[from] MailSetupError),
}

struct Stores {
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
    seed: Arc<dyn SeedStore>,
}

async fn bind_stores(settings: &AppSettings) -> Result<Stores, AssemblyError> {
    match &settings.database_url {
        Some(url) => {
            let pool = DbPool::new(PoolConfig::new(url, settings.db_pool_size())).await?;
            Ok(Stores {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                products: Arc::new(DieselProductRepository::new(pool.clone())),
                seed: Arc::new(DieselSeedStore::new(pool)),
            })
        }
        None => {
            info!("database_url not set; using in-memory stores");
            Ok(Stores {
                users: Arc::new(MemoryUserRepository::new()),
                products: Arc::new(MemoryProductRepository::new()),
                seed: Arc::new(MemorySeedStore::new()),
            })
        }
    }
}

async fn bind_audit(settings: &AppSettings) -> Result<Arc<dyn AuditTrail>, AssemblyError> {
    match &settings.mongo_url {
        Some(url) => {
            let trail = MongoAuditTrail::connect(url, settings.mongo_database()).await?;
            Ok(Arc::new(trail))
        }
        None => {
            info!("mongo_url not set; audit events will be dropped");
            Ok(Arc::new(NoopAuditTrail))
        }
    }
}

async fn bind_mailer(settings: &AppSettings) -> Result<Arc<dyn Mailer>, AssemblyError> {
    match &settings.smtp_url {
        Some(url) => Ok(Arc::new(
            SmtpMailer::from_url(url, settings.mail_from()).await?,
        )),
        None => {
            info!("smtp_url not set; outbound mail will be dropped");
            Ok(Arc::new(NoopMailer))
        }
    }
}

/// Fully assembled application: every extension bound, nothing serving yet.
pub struct Extensions {
    pub mode: StartupMode,
    pub hooks: Vec<HookName>,
    pub auth: Arc<AuthService>,
    pub products: Arc<ProductService>,
    pub tokens: TokenCodec,
    pub ws_state: WsState,
    pub mailer: Arc<dyn Mailer>,
    pub queue: RedisStorage<WelcomeEmailJob>,
    seed_runner: SeedRunner,
    bootstrap: BootstrapSeed,
    broker: RedisBroker,
}

impl Extensions {
    /// Bind every extension for the requested startup mode.
    pub async fn build(settings: &AppSettings, mode: StartupMode) -> Result<Self, AssemblyError> {
        // Mandatory settings first so misconfiguration fails before any
        // network connection is attempted.
        let hooks = settings.hooks()?;
        let broker_url = settings.broker_url()?.to_owned();
        let tokens = TokenCodec::new(settings.jwt_secret()?, settings.token_ttl_minutes());

        let broker = RedisBroker::connect(&broker_url).await?;
        let queue = connect_queue(&broker_url).await?;

        let stores = bind_stores(settings).await?;
        let audit = bind_audit(settings).await?;
        let mailer = bind_mailer(settings).await?;

        let notifications = Arc::new(broker.notification_bus());
        let dispatcher = Arc::new(RedisTaskDispatcher::new(queue.clone()));

        let auth = Arc::new(AuthService::new(
            stores.users.clone(),
            dispatcher,
            notifications.clone(),
            audit,
            tokens.clone(),
        ));
        let products = Arc::new(ProductService::new(stores.products.clone(), notifications));
        let seed_runner = SeedRunner::new(stores.users, stores.seed);

        info!(?mode, hook_count = hooks.len(), "extensions bound");

        Ok(Self {
            mode,
            hooks,
            auth,
            products,
            tokens,
            ws_state: WsState::new(),
            mailer,
            queue,
            seed_runner,
            bootstrap: settings.bootstrap_seed(),
            broker,
        })
    }

    /// Apply the idempotent bootstrap seed.
    pub async fn run_seed(&self) -> Result<SeedOutcome, SeedError> {
        self.seed_runner.run(&self.bootstrap).await
    }

    /// Start forwarding broker notifications to WebSocket sessions.
    pub fn spawn_notification_bridge(&self) {
        self.broker.spawn_notification_bridge(self.ws_state.sender());
    }

    pub fn hook_enabled(&self, hook: HookName) -> bool {
        self.hooks.contains(&hook)
    }
}
