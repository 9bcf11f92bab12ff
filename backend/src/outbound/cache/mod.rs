//! Redis broker adapter: notification publishing and the pub/sub bridge.
//!
//! Notifications are published to a single broker channel so every server
//! process can fan them out to its own WebSocket sessions. Publishing uses a
//! pooled connection; the subscription bridge holds a dedicated connection
//! because Redis pub/sub takes the connection out of request/response mode.

use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::{redis, RedisConnectionManager};
use futures_util::StreamExt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::ports::{Notification, NotificationBus, NotifyError};

/// Broker channel carrying every notification.
pub const NOTIFICATIONS_CHANNEL: &str = "notifications";

/// Delay before re-establishing a dropped pub/sub connection.
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(2);

/// Errors raised while connecting to the broker.
#[derive(Debug, Clone, thiserror::Error)]
#[error("broker connection failed: {message}")]
pub struct BrokerError {
    pub message: String,
}

impl BrokerError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Shared Redis handle backing publishing and the pub/sub bridge.
#[derive(Clone, Debug)]
pub struct RedisBroker {
    pool: Pool<RedisConnectionManager>,
    client: redis::Client,
}

impl RedisBroker {
    /// Connect to the broker, verifying the server answers before the pool
    /// is handed out. The pool itself connects lazily, so an unreachable
    /// broker must be caught here rather than on the first publish.
    pub async fn connect(url: &str) -> Result<Self, BrokerError> {
        let client = redis::Client::open(url).map_err(|err| BrokerError::new(err.to_string()))?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| BrokerError::new(err.to_string()))?;
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|err| BrokerError::new(err.to_string()))?;

        let manager =
            RedisConnectionManager::new(url).map_err(|err| BrokerError::new(err.to_string()))?;
        let pool = Pool::builder()
            .build(manager)
            .await
            .map_err(|err| BrokerError::new(err.to_string()))?;
        Ok(Self { pool, client })
    }

    /// Publishing half of the broker, usable as a [`NotificationBus`].
    pub fn notification_bus(&self) -> RedisNotificationBus {
        RedisNotificationBus {
            pool: self.pool.clone(),
        }
    }

    /// Spawn the bridge task feeding broker notifications into the
    /// in-process fan-out channel. The task resubscribes with a short delay
    /// whenever the pub/sub connection drops.
    pub fn spawn_notification_bridge(
        &self,
        sender: broadcast::Sender<Notification>,
    ) -> JoinHandle<()> {
        let client = self.client.clone();
        tokio::spawn(async move {
            loop {
                match subscribe_and_forward(&client, &sender).await {
                    Ok(()) => info!("notification subscription ended; resubscribing"),
                    Err(err) => warn!(error = %err, "notification subscription failed"),
                }
                tokio::time::sleep(RESUBSCRIBE_DELAY).await;
            }
        })
    }
}

async fn subscribe_and_forward(
    client: &redis::Client,
    sender: &broadcast::Sender<Notification>,
) -> Result<(), redis::RedisError> {
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.subscribe(NOTIFICATIONS_CHANNEL).await?;
    info!(channel = NOTIFICATIONS_CHANNEL, "subscribed to notification channel");

    let mut messages = pubsub.on_message();
    while let Some(message) = messages.next().await {
        let payload: String = match message.get_payload() {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "discarding non-text notification payload");
                continue;
            }
        };
        match serde_json::from_str::<Notification>(&payload) {
            Ok(notification) => {
                // Send only fails when no session is subscribed; that is
                // not an error for a broadcast.
                let _ = sender.send(notification);
            }
            Err(err) => {
                warn!(error = %err, "discarding malformed notification payload");
            }
        }
    }
    Ok(())
}

/// Publishes notifications to the broker channel.
#[derive(Clone)]
pub struct RedisNotificationBus {
    pool: Pool<RedisConnectionManager>,
}

#[async_trait]
impl NotificationBus for RedisNotificationBus {
    async fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        let payload = serde_json::to_string(&notification)
            .map_err(|err| NotifyError::new(err.to_string()))?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| NotifyError::new(err.to_string()))?;
        let receivers: i64 = conn
            .publish(NOTIFICATIONS_CHANNEL, payload)
            .await
            .map_err(|err| NotifyError::new(err.to_string()))?;
        debug!(event = %notification.event, receivers, "notification published");
        Ok(())
    }
}
