// Relay fan-out: every orchestrator message, serialized once, mirrored to `/ws` clients.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use crate::domain::RelayMessage;
use crate::interface_adapters::protocol::RelayMessageDto;
use crate::interface_adapters::state::AppState;

pub async fn relay_serializer(
    mut relay_rx: broadcast::Receiver<RelayMessage>,
    relay_bytes_tx: broadcast::Sender<Utf8Bytes>,
    relay_latest_tx: watch::Sender<Utf8Bytes>,
) {
    loop {
        match relay_rx.recv().await {
            Ok(message) => {
                let txt = match serde_json::to_string(&RelayMessageDto::from(message)) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize relay message");
                        continue;
                    }
                };

                let bytes = Utf8Bytes::from(txt);
                relay_latest_tx.send_replace(bytes.clone());
                let _ = relay_bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "relay serializer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("relay channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let relay_rx = state.relay_bytes_tx.subscribe();
    let latest_rx = state.relay_latest_rx.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, relay_rx, latest_rx))
}

async fn handle_socket(
    mut socket: WebSocket,
    mut relay_rx: broadcast::Receiver<Utf8Bytes>,
    latest_rx: watch::Receiver<Utf8Bytes>,
) {
    info!("relay client connected");

    loop {
        let disconnect = tokio::select! {
            outgoing = relay_rx.recv() => match outgoing {
                Ok(bytes) => send_bytes(&mut socket, bytes).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "relay client lagged; sending latest message");
                    let latest = latest_rx.borrow().clone();
                    if latest.is_empty() {
                        false
                    } else {
                        send_bytes(&mut socket, latest).await
                    }
                }
                Err(broadcast::error::RecvError::Closed) => true,
            },
            // The relay is one-way; inbound frames only matter for disconnects.
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None => true,
                Some(Ok(_)) => false,
                Some(Err(e)) => {
                    debug!(error = ?e, "relay socket read error");
                    true
                }
            },
        };

        if disconnect {
            break;
        }
    }

    info!("relay client disconnected");
}

// Returns true when the client should be dropped.
async fn send_bytes(socket: &mut WebSocket, bytes: Utf8Bytes) -> bool {
    match socket.send(Message::Text(bytes)).await {
        Ok(()) => false,
        Err(e) => {
            debug!(error = ?e, "failed to send relay message");
            true
        }
    }
}
