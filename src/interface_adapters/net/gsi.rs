// Telemetry listener: a WebSocket client to the game's state feed that reconnects forever.

use std::fmt;
use std::io::ErrorKind;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};

use crate::domain::DomainEvent;
use crate::interface_adapters::frame::{FrameOutcome, decode_frame};
use crate::use_cases::normalize;

#[derive(Debug, Clone)]
pub struct ListenerSettings {
    // Full `ws://host:port/path` address of the telemetry feed.
    pub url: String,
    pub reconnect_delay: Duration,
}

#[derive(Debug)]
enum ListenerError {
    Connect(tungstenite::Error),
    Read(tungstenite::Error),
    // Nobody is left to consume events.
    EventsClosed,
}

impl ListenerError {
    fn is_refused(&self) -> bool {
        matches!(
            self,
            ListenerError::Connect(tungstenite::Error::Io(err))
                if err.kind() == ErrorKind::ConnectionRefused
        )
    }
}

impl fmt::Display for ListenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerError::Connect(err) => write!(f, "connect failed: {err}"),
            ListenerError::Read(err) => write!(f, "read failed: {err}"),
            ListenerError::EventsClosed => write!(f, "event stream closed"),
        }
    }
}

impl std::error::Error for ListenerError {}

/// Reads telemetry until the event receiver goes away, reconnecting after every close.
pub async fn gsi_loop(settings: ListenerSettings, events_tx: mpsc::Sender<DomainEvent>) {
    loop {
        match run_session(&settings.url, &events_tx).await {
            Ok(()) => debug!(url = %settings.url, "telemetry socket closed"),
            Err(ListenerError::EventsClosed) => {
                info!("event stream closed; listener exiting");
                return;
            }
            // The game is simply not running yet.
            Err(err) if err.is_refused() => debug!(url = %settings.url, "telemetry refused"),
            Err(err) => warn!(url = %settings.url, error = %err, "telemetry socket error"),
        }

        if events_tx.is_closed() {
            info!("event stream closed; listener exiting");
            return;
        }
        tokio::time::sleep(settings.reconnect_delay).await;
    }
}

async fn run_session(
    url: &str,
    events_tx: &mpsc::Sender<DomainEvent>,
) -> Result<(), ListenerError> {
    let (mut socket, _response) = connect_async(url)
        .await
        .map_err(ListenerError::Connect)?;
    info!("GSI input expected at {url}");

    while let Some(frame) = socket.next().await {
        match frame {
            Ok(Message::Text(text)) => forward_frame(text.as_str(), events_tx).await?,
            Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                Ok(text) => forward_frame(text, events_tx).await?,
                Err(err) => debug!(error = %err, "dropping non-utf8 binary frame"),
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
            Err(err) => {
                // Force the socket down; the caller reconnects.
                let _ = socket.close(None).await;
                return Err(ListenerError::Read(err));
            }
        }
    }

    Ok(())
}

// Decodes one frame and pushes its events in facet order.
async fn forward_frame(
    frame: &str,
    events_tx: &mpsc::Sender<DomainEvent>,
) -> Result<(), ListenerError> {
    let snapshot = match decode_frame(frame) {
        Ok(FrameOutcome::Snapshot(snapshot)) => snapshot,
        Ok(FrameOutcome::Skipped) => return Ok(()),
        Err(err) if err.is_syntax() => {
            debug!(error = %err, "dropping frame");
            return Ok(());
        }
        Err(err) => {
            warn!(error = %err, "dropping frame");
            return Ok(());
        }
    };

    if snapshot.is_empty() {
        debug!("frame carried no known facets");
    }
    for event in normalize(&snapshot) {
        events_tx
            .send(event)
            .await
            .map_err(|_| ListenerError::EventsClosed)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(events_rx: &mut mpsc::Receiver<DomainEvent>) -> Vec<DomainEvent> {
        let mut events = Vec::new();
        while let Ok(event) = events_rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn when_frame_is_a_snapshot_then_events_are_sent_in_facet_order() {
        let (events_tx, mut events_rx) = mpsc::channel(16);
        let frame = r#"{"round":{"phase":"live"},"map":{"name":"de_inferno"},"provider":{}}"#;

        forward_frame(frame, &events_tx).await.expect("forward frame");

        let kinds: Vec<&str> = drain(&mut events_rx).iter().map(DomainEvent::kind).collect();
        assert_eq!(kinds, ["connection", "map", "round"]);
    }

    #[tokio::test]
    async fn when_frame_is_noise_then_nothing_is_sent() {
        let (events_tx, mut events_rx) = mpsc::channel(16);

        for frame in ["", r#"{"_is_api_data":true}"#, "not json", "[1]", "\"text\""] {
            forward_frame(frame, &events_tx).await.expect("noise is not fatal");
        }

        assert!(drain(&mut events_rx).is_empty());
    }

    #[tokio::test]
    async fn when_event_receiver_is_gone_then_forwarding_reports_closed() {
        let (events_tx, events_rx) = mpsc::channel(16);
        drop(events_rx);

        let result = forward_frame(r#"{"map":{"name":"de_vertigo"}}"#, &events_tx).await;

        assert!(matches!(result, Err(ListenerError::EventsClosed)));
    }

    #[tokio::test]
    async fn when_feed_is_down_then_connect_is_reported_as_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind probe port");
        let addr = listener.local_addr().expect("probe addr");
        drop(listener);
        let (events_tx, _events_rx) = mpsc::channel(16);

        let err = run_session(&format!("ws://{addr}/"), &events_tx)
            .await
            .expect_err("nothing is listening");

        assert!(err.is_refused(), "{err}");
    }
}
