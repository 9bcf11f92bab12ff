//! Shared state for the WebSocket notification stream.

use tokio::sync::broadcast;

use crate::domain::ports::Notification;

/// Capacity of the in-process fan-out channel. Slow sessions that fall more
/// than this many events behind miss the overwritten ones.
pub const FANOUT_CAPACITY: usize = 256;

/// Fan-out hub connecting the notification source to WebSocket sessions.
///
/// The server process feeds one copy of every notification into the
/// broadcast channel (either directly from the in-process bus or from the
/// broker subscription bridge); each connected session holds a receiver.
#[derive(Clone)]
pub struct WsState {
    notifications: broadcast::Sender<Notification>,
}

impl WsState {
    pub fn new() -> Self {
        let (notifications, _) = broadcast::channel(FANOUT_CAPACITY);
        Self { notifications }
    }

    /// Sender half used by the notification bridge.
    pub fn sender(&self) -> broadcast::Sender<Notification> {
        self.notifications.clone()
    }

    /// Fresh receiver for a new session.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }
}

impl Default for WsState {
    fn default() -> Self {
        Self::new()
    }
}
