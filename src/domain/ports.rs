use crate::domain::events::DomainEvent;

/// Page the companion display should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Waiting,
    Map,
}

impl Page {
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Waiting => "waiting",
            Page::Map => "map",
        }
    }
}

/// Messages re-broadcast to relay consumers.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayMessage {
    Event(DomainEvent),
    // Tells consumers to re-read the current page.
    PageUpdate,
}

// Port for whatever renders the active page.
pub trait PresentationSink: Send {
    fn show_page(&self, page: Page);
}

// Port for the downstream relay that mirrors every event.
pub trait RelaySink: Send {
    fn relay(&self, message: RelayMessage);
}
