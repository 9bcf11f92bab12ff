//! WebSocket session tests over a real socket.

use super::*;

use actix_web::dev::{Server, ServerHandle};
use actix_web::{App, HttpServer};
use awc::ws::{Codec, Frame, Message as ClientMessage};
use awc::BoxedSocket;
use futures_util::{SinkExt, StreamExt};
use rstest::{fixture, rstest};
use serde_json::{json, Value};

use crate::inbound::ws::{self, WsState};

#[fixture]
async fn start_ws_server() -> (String, Server, WsState) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let ws_state = WsState::new();
    let app_state = ws_state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(app_state.clone()))
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    (format!("http://{addr}"), server, ws_state)
}

#[fixture]
async fn ws_client(
    #[future] start_ws_server: (String, Server, WsState),
) -> (actix_codec::Framed<BoxedSocket, Codec>, ServerHandle, WsState) {
    let (url, server, ws_state) = start_ws_server.await;
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let (_resp, socket) = awc::Client::default()
        .ws(format!("{url}/ws"))
        .connect()
        .await
        .expect("websocket connect");

    (socket, handle, ws_state)
}

async fn next_text_frame(socket: &mut actix_codec::Framed<BoxedSocket, Codec>) -> Vec<u8> {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return bytes.to_vec(),
            Frame::Ping(payload) => {
                socket
                    .send(ClientMessage::Pong(payload))
                    .await
                    .expect("send pong");
            }
            Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

#[rstest]
#[actix_rt::test]
async fn forwards_published_notifications_to_the_client(
    #[future] ws_client: (actix_codec::Framed<BoxedSocket, Codec>, ServerHandle, WsState),
) {
    let (mut socket, _server, ws_state) = ws_client.await;
    ws_state
        .sender()
        .send(Notification::new("user.created", json!({"id": 7})))
        .expect("session subscribed");

    let text = next_text_frame(&mut socket).await;
    let value: Value = serde_json::from_slice(&text).expect("json");
    assert_eq!(
        value.get("event").and_then(Value::as_str),
        Some("user.created")
    );
    assert_eq!(
        value
            .get("data")
            .and_then(|data| data.get("id"))
            .and_then(Value::as_i64),
        Some(7)
    );
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_without_client_traffic(
    #[future] ws_client: (actix_codec::Framed<BoxedSocket, Codec>, ServerHandle, WsState),
) {
    let (mut socket, _server, _ws_state) = ws_client.await;
    tokio::time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

    let observed_close = tokio::time::timeout(std::time::Duration::from_secs(2), async {
        let mut observed = None;
        while let Some(frame) = socket.next().await {
            match frame.expect("frame") {
                Frame::Ping(_) | Frame::Pong(_) => continue,
                Frame::Close(reason) => {
                    observed = reason;
                    break;
                }
                other => panic!("unexpected frame before close: {other:?}"),
            }
        }
        observed
    })
    .await
    .expect("close frame missing within timeout")
    .expect("close frame missing after timeout");

    assert_eq!(observed_close.code, awc::ws::CloseCode::Normal);
    assert_eq!(
        observed_close.description.as_deref(),
        Some("heartbeat timeout")
    );
}

#[rstest]
#[actix_rt::test]
async fn acknowledges_a_client_close(
    #[future] ws_client: (actix_codec::Framed<BoxedSocket, Codec>, ServerHandle, WsState),
) {
    let (mut socket, _server, _ws_state) = ws_client.await;
    socket
        .send(ClientMessage::Close(Some(awc::ws::CloseReason {
            code: awc::ws::CloseCode::Normal,
            description: None,
        })))
        .await
        .expect("send close");

    let observed = tokio::time::timeout(std::time::Duration::from_secs(2), async {
        while let Some(frame) = socket.next().await {
            match frame.expect("frame") {
                Frame::Ping(_) | Frame::Pong(_) => continue,
                Frame::Close(reason) => return reason,
                other => panic!("unexpected frame before close: {other:?}"),
            }
        }
        panic!("socket ended without a close frame");
    })
    .await
    .expect("close echo missing within timeout")
    .expect("close echo carries a reason");

    assert_eq!(observed.code, awc::ws::CloseCode::Normal);
}
