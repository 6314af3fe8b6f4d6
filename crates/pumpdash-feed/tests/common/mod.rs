/*
[INPUT]:  Test scenarios needing a live feed backend or wallet listing
[OUTPUT]: In-process WebSocket feed server, mock HTTP server, fixtures
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for pumpdash-feed tests

#![allow(dead_code)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use pumpdash_feed::{DashboardStore, WalletGroup, WalletRecord};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use wiremock::MockServer;

pub const PING: &str = r#"{"type":"ping"}"#;
pub const PONG: &str = r#"{"type":"pong"}"#;
pub const CLOSED: &str = "<closed>";
pub const WAIT: Duration = Duration::from_secs(5);

enum ServerAction {
    Text(String),
    Close,
}

/// Single-connection feed backend answering pings like the real one
pub struct MockFeedServer {
    pub url: String,
    received: mpsc::UnboundedReceiver<String>,
    actions: mpsc::UnboundedSender<ServerAction>,
}

impl MockFeedServer {
    /// Push a raw text frame to the client
    pub fn push(&self, text: impl Into<String>) {
        let _ = self.actions.send(ServerAction::Text(text.into()));
    }

    /// Push an `update` frame wrapping `payload`
    pub fn push_update(&self, payload: serde_json::Value) {
        let frame = serde_json::json!({ "type": "update", "payload": payload });
        self.push(frame.to_string());
    }

    /// Close the connection from the server side
    pub fn close(&self) {
        let _ = self.actions.send(ServerAction::Close);
    }

    /// Next frame the client sent, or `CLOSED` once it went away
    pub async fn next_received(&mut self) -> Option<String> {
        tokio::time::timeout(WAIT, self.received.recv())
            .await
            .ok()
            .flatten()
    }

    /// Next frame that is not a liveness probe
    pub async fn next_non_ping(&mut self) -> Option<String> {
        loop {
            let frame = self.next_received().await?;
            if frame != PING {
                return Some(frame);
            }
        }
    }
}

pub async fn start_mock_feed() -> MockFeedServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock feed listener");
    let addr = listener.local_addr().expect("mock feed address");

    let (received_tx, received) = mpsc::unbounded_channel();
    let (actions, mut actions_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(ws) = accept_async(stream).await else {
            return;
        };
        let (mut write, mut read) = ws.split();

        loop {
            tokio::select! {
                action = actions_rx.recv() => {
                    match action {
                        Some(ServerAction::Text(text)) => {
                            if write.send(Message::Text(text.into())).await.is_err() {
                                break;
                            }
                        }
                        Some(ServerAction::Close) | None => {
                            let _ = write.send(Message::Close(None)).await;
                            break;
                        }
                    }
                }
                incoming = read.next() => {
                    match incoming {
                        Some(Ok(Message::Text(text))) => {
                            let text = text.to_string();
                            if text == PING && write.send(Message::Text(PONG.to_string().into())).await.is_err() {
                                break;
                            }
                            let _ = received_tx.send(text);
                        }
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                            let _ = received_tx.send(CLOSED.to_string());
                            break;
                        }
                        Some(Ok(_)) => {}
                    }
                }
            }
        }
    });

    MockFeedServer {
        url: format!("ws://{addr}/ws/data/"),
        received,
        actions,
    }
}

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Store seeded with wallets "A" (group1) and "B" (group2), zero balances
pub fn store_with_wallets() -> DashboardStore {
    DashboardStore::with_wallets(vec![
        WalletRecord::new("A", "AddrA111", WalletGroup::Group1),
        WalletRecord::new("B", "AddrB222", WalletGroup::Group2),
    ])
}
