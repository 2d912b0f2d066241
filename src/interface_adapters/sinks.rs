// Channel-backed implementations of the orchestrator's sink ports.

use tokio::sync::{broadcast, watch};

use crate::domain::{Page, PresentationSink, RelayMessage, RelaySink};

/// Publishes the active page; readers always see the latest value.
pub struct WatchPresentation {
    page_tx: watch::Sender<Page>,
}

impl WatchPresentation {
    pub fn new(page_tx: watch::Sender<Page>) -> Self {
        Self { page_tx }
    }
}

impl PresentationSink for WatchPresentation {
    fn show_page(&self, page: Page) {
        // Stores the page even when nobody is subscribed.
        self.page_tx.send_replace(page);
    }
}

pub struct BroadcastRelay {
    relay_tx: broadcast::Sender<RelayMessage>,
}

impl BroadcastRelay {
    pub fn new(relay_tx: broadcast::Sender<RelayMessage>) -> Self {
        Self { relay_tx }
    }
}

impl RelaySink for BroadcastRelay {
    fn relay(&self, message: RelayMessage) {
        // No subscribers is fine; the relay is fire-and-forget.
        let _ = self.relay_tx.send(message);
    }
}
