//! Error types for the media plugin layer

use pagi_playback::PlaybackError;
use thiserror::Error;

/// Result type alias for plugin setup and voice output
pub type SkillResult<T> = Result<T, SkillError>;

/// Errors raised while building or wiring plugins.
///
/// Lookup failures during a command are not `SkillError`s; they become a
/// [`ResolveError`](crate::ResolveError) and a spoken prompt.
#[derive(Error, Debug)]
pub enum SkillError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),
}
