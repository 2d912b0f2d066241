// Raw telemetry frame handling: keepalive filtering, owner id repair, snapshot decode.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::domain::{FrameError, RawSnapshot};

/// Frames carrying this marker are API keepalives, not game state.
pub const KEEPALIVE_MARKER: &str = "_is_api_data";

// Steam ids overflow f64 precision, so bare owner ids of 10+ digits are quoted before parsing.
static BARE_OWNER_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"("owner":\s*)([0-9]{10,})"#).expect("owner id pattern is valid")
});

#[derive(Debug)]
pub enum FrameOutcome {
    // Empty or keepalive frame; nothing to normalize.
    Skipped,
    Snapshot(RawSnapshot),
}

/// Quotes bare numeric `owner` values long enough to lose precision as JSON numbers.
pub fn repair_owner_ids(frame: &str) -> Cow<'_, str> {
    BARE_OWNER_ID.replace_all(frame, r#"${1}"${2}""#)
}

pub fn decode_frame(frame: &str) -> Result<FrameOutcome, FrameError> {
    if frame.is_empty() || frame.contains(KEEPALIVE_MARKER) {
        return Ok(FrameOutcome::Skipped);
    }

    let repaired = repair_owner_ids(frame);
    let value: Value = serde_json::from_str(&repaired).map_err(FrameError::from_json)?;
    RawSnapshot::from_value(value).map(FrameOutcome::Snapshot)
}
