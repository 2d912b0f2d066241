// Shared fakes for integration tests: a stand-in game feed and a running radar instance.
#![allow(dead_code)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use gsi_radar::RadarSettings;
use gsi_radar::domain::DomainEvent;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, accept_async, connect_async};

pub const WAIT: Duration = Duration::from_secs(5);

pub type FeedSocket = WebSocketStream<TcpStream>;
pub type RelaySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Plays the game side of the telemetry feed on an ephemeral port.
pub struct FakeGameClient {
    listener: TcpListener,
    pub url: String,
}

impl FakeGameClient {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake game feed");
        let addr = listener.local_addr().expect("fake feed addr");
        Self {
            listener,
            url: format!("ws://{addr}/"),
        }
    }

    // Wait for the radar's listener to connect and finish the handshake.
    pub async fn accept(&self) -> FeedSocket {
        let (stream, _) = tokio::time::timeout(WAIT, self.listener.accept())
            .await
            .expect("listener should connect in time")
            .expect("accept feed connection");
        accept_async(stream).await.expect("feed handshake")
    }
}

pub async fn send_frame(feed: &mut FeedSocket, frame: &str) {
    feed.send(Message::text(frame.to_string())).await.expect("send frame");
}

pub async fn next_event(events_rx: &mut mpsc::Receiver<DomainEvent>) -> DomainEvent {
    tokio::time::timeout(WAIT, events_rx.recv())
        .await
        .expect("event should arrive in time")
        .expect("event stream open")
}

pub fn test_settings(gsi_url: &str, liveness_timeout: Option<Duration>) -> RadarSettings {
    RadarSettings {
        gsi_url: gsi_url.to_string(),
        reconnect_delay: Duration::from_millis(50),
        liveness_timeout,
        settle_delay: Duration::from_millis(200),
    }
}

// Start a radar on an ephemeral port and return its `host:port`.
pub async fn spawn_radar(settings: RadarSettings) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind radar port");
    let addr = listener.local_addr().expect("radar addr");
    tokio::spawn(async move {
        gsi_radar::run(listener, settings).await.expect("radar failed");
    });
    addr.to_string()
}

pub async fn connect_relay(radar_addr: &str) -> RelaySocket {
    let (socket, _) = connect_async(format!("ws://{radar_addr}/ws"))
        .await
        .expect("connect relay");
    socket
}

pub async fn next_relay_json(relay: &mut RelaySocket) -> Value {
    loop {
        let message = tokio::time::timeout(WAIT, relay.next())
            .await
            .expect("relay message should arrive in time")
            .expect("relay stream open")
            .expect("relay read");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).expect("relay json");
        }
    }
}
