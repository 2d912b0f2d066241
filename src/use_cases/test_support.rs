use std::sync::{Arc, Mutex};

use crate::domain::{Page, PresentationSink, RelayMessage, RelaySink};

// Presentation sink that remembers every page it was asked to show.
#[derive(Clone, Default)]
pub(crate) struct RecordingPresentation {
    pages: Arc<Mutex<Vec<Page>>>,
}

impl RecordingPresentation {
    pub(crate) fn pages(&self) -> Vec<Page> {
        self.pages.lock().expect("pages mutex poisoned").clone()
    }
}

impl PresentationSink for RecordingPresentation {
    fn show_page(&self, page: Page) {
        self.pages.lock().expect("pages mutex poisoned").push(page);
    }
}

// Relay sink that keeps the full message log for ordering assertions.
#[derive(Clone, Default)]
pub(crate) struct RecordingRelay {
    messages: Arc<Mutex<Vec<RelayMessage>>>,
}

impl RecordingRelay {
    pub(crate) fn messages(&self) -> Vec<RelayMessage> {
        self.messages.lock().expect("messages mutex poisoned").clone()
    }

    pub(crate) fn page_updates(&self) -> usize {
        self.messages()
            .iter()
            .filter(|message| matches!(message, RelayMessage::PageUpdate))
            .count()
    }
}

impl RelaySink for RecordingRelay {
    fn relay(&self, message: RelayMessage) {
        self.messages
            .lock()
            .expect("messages mutex poisoned")
            .push(message);
    }
}
