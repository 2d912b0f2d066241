use axum::extract::ws::Utf8Bytes;
use tokio::sync::{broadcast, watch};

use crate::domain::Page;

// Shared handles for the relay and page endpoints.
pub struct AppState {
    // Serialized relay messages, shared by every `/ws` client.
    pub relay_bytes_tx: broadcast::Sender<Utf8Bytes>,
    // Most recent serialized relay message, resent to clients that fall behind.
    pub relay_latest_rx: watch::Receiver<Utf8Bytes>,
    pub page_rx: watch::Receiver<Page>,
}
