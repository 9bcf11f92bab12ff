//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (relational store, document store, broker, mailer, task queue). Each
//! trait exposes strongly typed errors so adapters map their failures into
//! predictable variants. In-memory implementations live here too: they are
//! the fallback wiring when a backend is not configured and the test
//! doubles for service-level tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::product::Product;
use super::user::{Email, User};

/// Errors surfaced by relational persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Connectivity or pool checkout failures.
    #[error("store connection failed: {message}")]
    Connection { message: String },
    /// Unique constraint violation.
    #[error("duplicate value for {field}")]
    Duplicate { field: String },
    /// Catch-all for query failures.
    #[error("store query failed: {message}")]
    Query { message: String },
}

impl PersistenceError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>) -> Self {
        Self::Duplicate {
            field: field.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// User persistence port.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; duplicate emails yield [`PersistenceError::Duplicate`].
    async fn insert(&self, user: &User) -> Result<(), PersistenceError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, PersistenceError>;
}

/// Product persistence port.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<(), PersistenceError>;

    async fn list(&self) -> Result<Vec<Product>, PersistenceError>;
}

/// Seed-run bookkeeping port backing the idempotent bootstrap step.
#[async_trait]
pub trait SeedStore: Send + Sync {
    async fn applied_at(&self, seed_key: &str) -> Result<Option<DateTime<Utc>>, PersistenceError>;

    async fn mark_applied(&self, seed_key: &str) -> Result<(), PersistenceError>;
}

/// Outbound mail message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: Email,
    pub subject: String,
    pub body: String,
}

/// Errors surfaced by the mail adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mail transport failed: {message}")]
pub struct MailError {
    pub message: String,
}

impl MailError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Mail transport port.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Real-time notification published to connected socket clients.
///
/// Published to the broker channel so every server process fans it out to
/// its own WebSocket sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Event name, e.g. `user.created`.
    pub event: String,
    /// Event payload.
    pub data: Value,
}

impl Notification {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Errors surfaced by the notification bus adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("notification bus failed: {message}")]
pub struct NotifyError {
    pub message: String,
}

impl NotifyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Notification publishing port.
#[async_trait]
pub trait NotificationBus: Send + Sync {
    async fn publish(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Background job sent to the task queue on signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeEmailJob {
    pub to: Email,
    pub name: String,
}

/// Errors surfaced when handing a job to the queue backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task dispatch failed: {message}")]
pub struct TaskDispatchError {
    pub message: String,
}

impl TaskDispatchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fire-and-forget task dispatch port. Completion, retry, and cancellation
/// are the queue backend's responsibility.
#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    async fn dispatch_welcome_email(&self, job: WelcomeEmailJob) -> Result<(), TaskDispatchError>;
}

/// Audit event appended to the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub event: String,
    pub subject: String,
    pub detail: Value,
}

/// Errors surfaced by the document store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("audit trail write failed: {message}")]
pub struct AuditError {
    pub message: String,
}

impl AuditError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Document-store audit port. Writes are best-effort from the caller's
/// perspective; services log failures instead of failing requests.
#[async_trait]
pub trait AuditTrail: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError>;
}

// --- In-memory fallbacks -------------------------------------------------

/// In-memory user store keyed by email.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users; exposed for assertions in tests.
    pub fn len(&self) -> usize {
        self.users.lock().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), PersistenceError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| PersistenceError::query("user store poisoned"))?;
        if users.contains_key(user.email.as_str()) {
            return Err(PersistenceError::duplicate("email"));
        }
        users.insert(user.email.as_str().to_owned(), user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, PersistenceError> {
        let users = self
            .users
            .lock()
            .map_err(|_| PersistenceError::query("user store poisoned"))?;
        Ok(users.get(email.as_str()).cloned())
    }
}

/// In-memory product store preserving insertion order.
#[derive(Default)]
pub struct MemoryProductRepository {
    products: Mutex<Vec<Product>>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn insert(&self, product: &Product) -> Result<(), PersistenceError> {
        let mut products = self
            .products
            .lock()
            .map_err(|_| PersistenceError::query("product store poisoned"))?;
        products.push(product.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>, PersistenceError> {
        let products = self
            .products
            .lock()
            .map_err(|_| PersistenceError::query("product store poisoned"))?;
        Ok(products.clone())
    }
}

/// In-memory seed-run bookkeeping.
#[derive(Default)]
pub struct MemorySeedStore {
    runs: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MemorySeedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeedStore for MemorySeedStore {
    async fn applied_at(&self, seed_key: &str) -> Result<Option<DateTime<Utc>>, PersistenceError> {
        let runs = self
            .runs
            .lock()
            .map_err(|_| PersistenceError::query("seed store poisoned"))?;
        Ok(runs.get(seed_key).copied())
    }

    async fn mark_applied(&self, seed_key: &str) -> Result<(), PersistenceError> {
        let mut runs = self
            .runs
            .lock()
            .map_err(|_| PersistenceError::query("seed store poisoned"))?;
        runs.entry(seed_key.to_owned()).or_insert_with(Utc::now);
        Ok(())
    }
}

// --- No-op adapters for unconfigured subsystems --------------------------

/// Mailer that drops messages; used when SMTP is not configured.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        tracing::debug!(to = %message.to, subject = %message.subject, "mailer disabled; dropping message");
        Ok(())
    }
}

/// Notification bus that drops events; used when the broker has no
/// subscribers to serve (worker mode, tests).
pub struct NoopNotificationBus;

#[async_trait]
impl NotificationBus for NoopNotificationBus {
    async fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        tracing::debug!(event = %notification.event, "notification bus disabled; dropping event");
        Ok(())
    }
}

/// Dispatcher that drops jobs; used when the queue is not bound.
pub struct NoopTaskDispatcher;

#[async_trait]
impl TaskDispatcher for NoopTaskDispatcher {
    async fn dispatch_welcome_email(&self, job: WelcomeEmailJob) -> Result<(), TaskDispatchError> {
        tracing::debug!(to = %job.to, "task queue disabled; dropping job");
        Ok(())
    }
}

/// Audit trail that drops events; used when the document store is not
/// configured.
pub struct NoopAuditTrail;

#[async_trait]
impl AuditTrail for NoopAuditTrail {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        tracing::debug!(event = %event.event, "document store disabled; dropping audit event");
        Ok(())
    }
}
