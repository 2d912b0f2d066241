// Framework bootstrap for the radar runtime.

use crate::domain::Page;
use crate::frameworks::config::{self, RadarSettings};
use crate::interface_adapters::http::page_handler;
use crate::interface_adapters::net::{ListenerSettings, gsi_loop, relay_serializer, ws_handler};
use crate::interface_adapters::sinks::{BroadcastRelay, WatchPresentation};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{Orchestrator, OrchestratorSettings};

use axum::{Router, extract::ws::Utf8Bytes, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{broadcast, mpsc, watch};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Starts the listener, orchestrator and relay tasks, then serves `/ws` and `/page`.
pub async fn run(listener: tokio::net::TcpListener, settings: RadarSettings) -> Result<()> {
    let address = listener.local_addr()?;

    let (events_tx, events_rx) = mpsc::channel(config::EVENT_CHANNEL_CAPACITY);
    let (relay_tx, relay_rx) = broadcast::channel(config::RELAY_BROADCAST_CAPACITY);
    let (relay_bytes_tx, _) = broadcast::channel(config::RELAY_BROADCAST_CAPACITY);
    let (relay_latest_tx, relay_latest_rx) = watch::channel(Utf8Bytes::from(""));
    let (page_tx, page_rx) = watch::channel(Page::Waiting);

    tokio::spawn(relay_serializer(
        relay_rx,
        relay_bytes_tx.clone(),
        relay_latest_tx,
    ));

    let orchestrator = Orchestrator::new(
        WatchPresentation::new(page_tx),
        BroadcastRelay::new(relay_tx),
        OrchestratorSettings {
            liveness_timeout: settings.liveness_timeout,
            settle_delay: settings.settle_delay,
        },
    );
    tokio::spawn(orchestrator.run(events_rx));

    tracing::debug!(
        gsi_url = %settings.gsi_url,
        liveness_timeout_ms = settings.liveness_timeout.map(|t| t.as_millis() as u64),
        "telemetry listener configured"
    );
    tokio::spawn(gsi_loop(
        ListenerSettings {
            url: settings.gsi_url,
            reconnect_delay: settings.reconnect_delay,
        },
        events_tx,
    ));

    let state = Arc::new(AppState {
        relay_bytes_tx,
        relay_latest_rx,
        page_rx,
    });
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/page", get(page_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::relay_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, RadarSettings::from_env()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
