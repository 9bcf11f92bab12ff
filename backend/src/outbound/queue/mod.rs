//! Apalis task queue adapter over the Redis broker.
//!
//! The server process only pushes jobs; the worker process consumes them and
//! owns delivery retries. Both sides share the same storage namespace so a
//! job pushed by any server lands on any worker.

use std::sync::Arc;

use apalis::prelude::*;
use apalis_redis::RedisStorage;
use tracing::{debug, info};

use crate::domain::ports::{
    MailMessage, Mailer, TaskDispatchError, TaskDispatcher, WelcomeEmailJob,
};

/// Storage namespace for welcome email jobs.
const WELCOME_EMAIL_NAMESPACE: &str = "backend:welcome-email";

/// Errors raised while connecting to the queue backend.
#[derive(Debug, Clone, thiserror::Error)]
#[error("queue connection failed: {message}")]
pub struct QueueError {
    pub message: String,
}

impl QueueError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Connect the welcome-email storage on the broker.
pub async fn connect_queue(url: &str) -> Result<RedisStorage<WelcomeEmailJob>, QueueError> {
    let conn = apalis_redis::connect(url)
        .await
        .map_err(|err| QueueError::new(err.to_string()))?;
    let config = apalis_redis::Config::default().set_namespace(WELCOME_EMAIL_NAMESPACE);
    Ok(RedisStorage::new_with_config(conn, config))
}

/// Fire-and-forget dispatcher used by the HTTP process.
#[derive(Clone)]
pub struct RedisTaskDispatcher {
    storage: RedisStorage<WelcomeEmailJob>,
}

impl RedisTaskDispatcher {
    pub fn new(storage: RedisStorage<WelcomeEmailJob>) -> Self {
        Self { storage }
    }
}

#[async_trait::async_trait]
impl TaskDispatcher for RedisTaskDispatcher {
    async fn dispatch_welcome_email(&self, job: WelcomeEmailJob) -> Result<(), TaskDispatchError> {
        // `push` needs exclusive access; the storage handle is cheap to clone.
        let mut storage = self.storage.clone();
        let parts = storage
            .push(job)
            .await
            .map_err(|err| TaskDispatchError::new(err.to_string()))?;
        debug!(task_id = %parts.task_id, "welcome email job queued");
        Ok(())
    }
}

fn welcome_message(job: &WelcomeEmailJob) -> MailMessage {
    MailMessage {
        to: job.to.clone(),
        subject: "Welcome aboard".to_owned(),
        body: format!(
            "Hi {},\n\nYour account is ready. Log in with your email address to get started.\n",
            job.name
        ),
    }
}

async fn send_welcome_email(
    job: WelcomeEmailJob,
    mailer: Data<Arc<dyn Mailer>>,
) -> Result<(), Error> {
    let message = welcome_message(&job);
    info!(to = %message.to, "delivering welcome email");
    mailer
        .send(message)
        .await
        .map_err(|err| Error::Failed(Arc::new(Box::new(err))))
}

/// Run the worker loop consuming welcome-email jobs until shutdown.
pub async fn run_worker(
    storage: RedisStorage<WelcomeEmailJob>,
    mailer: Arc<dyn Mailer>,
) -> std::io::Result<()> {
    Monitor::new()
        .register(
            WorkerBuilder::new("welcome-email")
                .data(mailer)
                .backend(storage)
                .build_fn(send_welcome_email),
        )
        .run()
        .await
}
