use std::{env, time::Duration};

// Runtime settings read from the environment, plus fixed runtime constants.

pub fn gsi_host() -> String {
    env::var("GSI_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

pub fn gsi_port() -> u16 {
    env::var("GSI_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(36363)
}

pub fn gsi_endpoint() -> String {
    normalize_endpoint(&env::var("GSI_ENDPOINT").unwrap_or_default())
}

pub fn gsi_url() -> String {
    format!("ws://{}:{}{}", gsi_host(), gsi_port(), gsi_endpoint())
}

/// Ensures the endpoint path starts with `/`.
pub fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{endpoint}")
    }
}

pub fn relay_port() -> u16 {
    env::var("RELAY_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(36364)
}

pub fn liveness_timeout() -> Option<Duration> {
    parse_liveness_timeout(env::var("CONNECTION_TIMEOUT_SECS").ok().as_deref())
}

/// Seconds as a decimal; a negative value disables the liveness timer.
pub fn parse_liveness_timeout(raw: Option<&str>) -> Option<Duration> {
    let secs = raw
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|secs| !secs.is_nan())
        .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS);
    Duration::try_from_secs_f64(secs).ok()
}

pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
pub const RELAY_BROADCAST_CAPACITY: usize = 128;

pub const RECONNECT_DELAY: Duration = Duration::from_millis(1000);
// Gap between the two page-update notices of one page change.
pub const PAGE_SETTLE_DELAY: Duration = Duration::from_millis(200);
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: f64 = 30.0;

#[derive(Debug, Clone)]
pub struct RadarSettings {
    pub gsi_url: String,
    pub reconnect_delay: Duration,
    pub liveness_timeout: Option<Duration>,
    pub settle_delay: Duration,
}

impl RadarSettings {
    pub fn from_env() -> Self {
        Self {
            gsi_url: gsi_url(),
            reconnect_delay: RECONNECT_DELAY,
            liveness_timeout: liveness_timeout(),
            settle_delay: PAGE_SETTLE_DELAY,
        }
    }
}
