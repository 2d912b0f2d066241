use std::fmt;

// Reasons an inbound telemetry frame could not become a snapshot.
#[derive(Debug)]
pub enum FrameError {
    // Frame text is not well-formed JSON (truncated, garbage, partial write).
    Syntax(serde_json::Error),
    // Well-formed JSON that does not have the shape of a snapshot.
    Shape(String),
}

impl FrameError {
    pub fn from_json(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() {
            FrameError::Syntax(err)
        } else {
            FrameError::Shape(err.to_string())
        }
    }

    /// Plain syntax failures are expected noise on a live feed and are dropped quietly.
    pub fn is_syntax(&self) -> bool {
        matches!(self, FrameError::Syntax(_))
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Syntax(err) => write!(f, "unparsable frame: {err}"),
            FrameError::Shape(reason) => write!(f, "unexpected frame shape: {reason}"),
        }
    }
}

impl std::error::Error for FrameError {}
