//! WebSocket inbound adapter streaming notifications to clients.
//!
//! The `/ws` endpoint upgrades the connection and subscribes the session to
//! the in-process fan-out channel; the broker bridge (or the in-process bus)
//! feeds that channel with every published notification.

use actix_web::web::{self, Payload};
use actix_web::{get, HttpRequest, HttpResponse};
use tracing::error;

mod session;

pub mod messages;
pub mod state;

pub use state::WsState;

/// Handle WebSocket upgrade for the `/ws` endpoint.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let receiver = state.subscribe();
    let (response, session, message_stream) =
        actix_ws::handle(&req, stream).map_err(|err| {
            error!(error = %err, "websocket upgrade failed");
            err
        })?;
    actix_web::rt::spawn(session::handle_ws_session(receiver, session, message_stream));
    Ok(response)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::domain::ports::Notification;

    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_notifications() {
        let state = WsState::new();
        let mut receiver = state.subscribe();

        state
            .sender()
            .send(Notification::new("user.created", json!({"id": 7})))
            .expect("at least one subscriber");

        let received = receiver.recv().await.expect("notification delivered");
        assert_eq!(received.event, "user.created");
        assert_eq!(received.data["id"], 7);
    }

    #[tokio::test]
    async fn each_subscriber_gets_its_own_copy() {
        let state = WsState::new();
        let mut first = state.subscribe();
        let mut second = state.subscribe();

        state
            .sender()
            .send(Notification::new("product.created", json!({})))
            .expect("subscribers present");

        assert_eq!(first.recv().await.expect("first copy").event, "product.created");
        assert_eq!(second.recv().await.expect("second copy").event, "product.created");
    }
}
