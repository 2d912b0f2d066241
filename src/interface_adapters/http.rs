// Plain HTTP endpoints.

use std::sync::Arc;

use axum::extract::State;

use crate::interface_adapters::state::AppState;

/// Current page as plain text (`waiting` or `map`).
pub async fn page_handler(State(state): State<Arc<AppState>>) -> &'static str {
    state.page_rx.borrow().as_str()
}
