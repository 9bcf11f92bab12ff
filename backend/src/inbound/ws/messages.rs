//! Wire payloads sent to WebSocket clients.

use serde::Serialize;
use serde_json::Value;

use crate::domain::ports::Notification;

/// Notification frame as delivered to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFrame {
    pub event: String,
    pub data: Value,
}

impl From<Notification> for NotificationFrame {
    fn from(notification: Notification) -> Self {
        Self {
            event: notification.event,
            data: notification.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn frame_serialises_event_and_data() {
        let frame: NotificationFrame =
            Notification::new("user.created", json!({"id": 1})).into();
        let value = serde_json::to_value(&frame).expect("serialises");
        assert_eq!(value["event"], "user.created");
        assert_eq!(value["data"]["id"], 1);
    }
}
