//! Media references and session outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Resolved locator for something playable, plus the title spoken to the user.
///
/// Produced by a content resolver and consumed once per session. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    uri: String,
    title: String,
}

impl MediaReference {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
        }
    }

    /// Stream or file locator handed to the backend.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Human-readable title ("Now playing <title>").
    pub fn title(&self) -> &str {
        &self.title
    }

    /// True when the locator is non-blank. Unresolved references never reach the backend.
    pub fn is_resolved(&self) -> bool {
        !self.uri.trim().is_empty()
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.title, self.uri)
    }
}

/// Why a session ended in [`SessionOutcome::Failed`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Empty or unresolved reference; rejected before any backend call.
    #[error("no input")]
    NoInput,

    /// The backend reported a playback fault after starting.
    #[error("backend: {0}")]
    Backend(String),
}

/// The single terminal result of one playback attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Backend reported a natural end of media.
    Completed,
    /// Backend reported an error, or the input was unusable.
    Failed(FailureReason),
    /// The stop button was pressed.
    Interrupted,
}

impl SessionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SessionOutcome::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionOutcome::Completed => "completed",
            SessionOutcome::Failed(_) => "failed",
            SessionOutcome::Interrupted => "interrupted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_uri_is_unresolved() {
        assert!(!MediaReference::new("", "nothing").is_resolved());
        assert!(!MediaReference::new("   ", "nothing").is_resolved());
        assert!(MediaReference::new("stream://ok", "Test Track").is_resolved());
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(SessionOutcome::Completed.as_str(), "completed");
        assert_eq!(
            SessionOutcome::Failed(FailureReason::NoInput).as_str(),
            "failed"
        );
        assert!(!SessionOutcome::Interrupted.is_completed());
    }
}
