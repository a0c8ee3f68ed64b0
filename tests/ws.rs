//! WebSocket event stream tests against a live server.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

use common::{TestServer, spawn_server};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect(server: &TestServer, path: &str) -> WsStream {
    let Ok((stream, _)) = tokio_tungstenite::connect_async(server.ws_url(path)).await else {
        panic!("ws connect failed");
    };
    stream
}

async fn next_json(stream: &mut WsStream) -> Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), stream.next()).await
        else {
            panic!("no ws message within timeout");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str(&text) else {
                panic!("ws message is not JSON");
            };
            return value;
        }
    }
}

async fn submit(server: &TestServer, wallet: &str, mv: &str) {
    let Ok(resp) = server
        .client
        .post(server.url("/api/v1/puzzles/2/attempts"))
        .json(&json!({ "wallet": wallet, "move": mv }))
        .send()
        .await
    else {
        panic!("submit failed");
    };
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
}

#[tokio::test]
async fn wallet_filter_only_forwards_own_events() {
    let server = spawn_server().await;
    let mut stream = connect(&server, "/ws?wallet=0xWatcher").await;

    submit(&server, "0xsomeone-else", "Nc7+").await;
    submit(&server, "0xwatcher", "Nc7+").await;

    let msg = next_json(&mut stream).await;
    assert_eq!(msg["type"], "event");
    assert_eq!(msg["payload"]["event_type"], "attempt_submitted");
    assert_eq!(msg["payload"]["wallet"], "0xwatcher");
    assert_eq!(msg["payload"]["is_correct"], true);
    assert_eq!(msg["payload"]["remaining_attempts"], 2);
}

#[tokio::test]
async fn unfiltered_stream_sees_every_wallet() {
    let server = spawn_server().await;
    let mut stream = connect(&server, "/ws").await;

    submit(&server, "0xalice", "Nb5").await;
    let msg = next_json(&mut stream).await;
    assert_eq!(msg["payload"]["wallet"], "0xalice");
    assert_eq!(msg["payload"]["is_correct"], false);
}

#[tokio::test]
async fn subscribe_command_extends_filter() {
    let server = spawn_server().await;
    let mut stream = connect(&server, "/ws?wallet=0xfirst").await;

    let command = json!({
        "id": "sub-1",
        "type": "command",
        "timestamp": "2025-01-01T00:00:00Z",
        "payload": { "command": "subscribe", "wallets": ["0xSecond"] }
    });
    let Ok(()) = stream.send(Message::text(command.to_string())).await else {
        panic!("ws send failed");
    };
    let reply = next_json(&mut stream).await;
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["id"], "sub-1");
    assert_eq!(reply["payload"]["count"], 2);

    submit(&server, "0xsecond", "Nc7+").await;
    let msg = next_json(&mut stream).await;
    assert_eq!(msg["payload"]["wallet"], "0xsecond");
}
