// Page orchestration for the companion display.
// Invariants: every event reaches the relay before page logic runs; state only changes on
// message receipt or timer expiry inside the single orchestrator task.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::info;

use crate::domain::{DomainEvent, Page, PresentationSink, RelayMessage, RelaySink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    NoMap,
    Waiting,
    OnMap,
}

/// Pure page transitions; timers and sinks live in [`Orchestrator`].
#[derive(Debug)]
pub struct PageMachine {
    state: PageState,
    has_map: bool,
    // Connection pings only matter when the liveness mechanism is on.
    liveness_enabled: bool,
    session_signaled: bool,
}

impl PageMachine {
    pub fn new(liveness_enabled: bool) -> Self {
        Self {
            state: PageState::NoMap,
            has_map: false,
            liveness_enabled,
            session_signaled: false,
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn has_map(&self) -> bool {
        self.has_map
    }

    /// Applies an event and returns the page to broadcast, if any.
    pub fn on_event(&mut self, event: &DomainEvent) -> Option<Page> {
        match event {
            DomainEvent::Connection(_) => {
                if !self.liveness_enabled || self.session_signaled {
                    return None;
                }
                self.session_signaled = true;
                info!("connection established");
                if self.state == PageState::OnMap {
                    return None;
                }
                self.state = PageState::Waiting;
                Some(Page::Waiting)
            }
            DomainEvent::Map(name) if !self.has_map => {
                self.has_map = true;
                self.state = PageState::OnMap;
                info!(map = %name, "map selected");
                Some(Page::Map)
            }
            DomainEvent::InLobby => {
                self.has_map = false;
                // Lobby ticks repeat every frame; only the transition is announced.
                if self.state == PageState::Waiting {
                    return None;
                }
                self.state = PageState::Waiting;
                info!("map unknown, waiting");
                Some(Page::Waiting)
            }
            _ => None,
        }
    }

    /// The feed went quiet: forget the map and fall back to waiting.
    pub fn on_liveness_timeout(&mut self) -> Page {
        self.has_map = false;
        self.state = PageState::Waiting;
        Page::Waiting
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    // None disables the liveness timer and the connection signal.
    pub liveness_timeout: Option<Duration>,
    // Delay before the second page-update notice.
    pub settle_delay: Duration,
}

pub struct Orchestrator<P, R> {
    machine: PageMachine,
    presentation: P,
    relay: R,
    settings: OrchestratorSettings,
    liveness_deadline: Option<Instant>,
    settle_deadlines: VecDeque<Instant>,
}

impl<P, R> Orchestrator<P, R>
where
    P: PresentationSink,
    R: RelaySink,
{
    pub fn new(presentation: P, relay: R, settings: OrchestratorSettings) -> Self {
        Self {
            machine: PageMachine::new(settings.liveness_timeout.is_some()),
            presentation,
            relay,
            settings,
            liveness_deadline: None,
            settle_deadlines: VecDeque::new(),
        }
    }

    /// Drives the page machine until the event stream closes.
    pub async fn run(mut self, mut events_rx: mpsc::Receiver<DomainEvent>) {
        loop {
            tokio::select! {
                event = events_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => {
                            info!("event stream closed; orchestrator exiting");
                            break;
                        }
                    }
                }
                _ = wait_until(self.liveness_deadline) => {
                    self.liveness_deadline = None;
                    info!("liveness timeout");
                    let page = self.machine.on_liveness_timeout();
                    self.broadcast_page(page);
                }
                _ = wait_until(self.settle_deadlines.front().copied()) => {
                    self.settle_deadlines.pop_front();
                    self.relay.relay(RelayMessage::PageUpdate);
                }
            }
        }
    }

    fn handle_event(&mut self, event: DomainEvent) {
        let page = self.machine.on_event(&event);
        self.relay.relay(RelayMessage::Event(event));

        if let Some(page) = page {
            self.broadcast_page(page);
        }

        if let Some(window) = self.settings.liveness_timeout {
            // A window past the clock's range never expires.
            self.liveness_deadline = Instant::now().checked_add(window);
        }
    }

    fn broadcast_page(&mut self, page: Page) {
        self.presentation.show_page(page);
        self.relay.relay(RelayMessage::PageUpdate);
        // The relay can read the page before the presentation side has stored it; repeat later.
        if let Some(deadline) = Instant::now().checked_add(self.settings.settle_delay) {
            self.settle_deadlines.push_back(deadline);
        }
        info!(page = page.as_str(), "page updated");
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
