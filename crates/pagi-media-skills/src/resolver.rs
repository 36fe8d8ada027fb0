//! Turning a spoken query into something playable.

use pagi_playback::MediaReference;
use thiserror::Error;

/// Why a query produced nothing playable. All variants read as "not found" to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The search returned no usable result.
    #[error("no match for {0:?}")]
    NoMatch(String),

    /// A result was found but it has no stream.
    #[error("no stream for {0:?}")]
    NoStream(String),

    /// The lookup itself failed (network, extractor, malformed response).
    #[error("lookup failed: {0}")]
    Lookup(String),
}

/// Resolves a free-text query to a [`MediaReference`]. May block on network I/O.
pub trait ContentResolver: Send + Sync {
    fn resolve(&self, query: &str) -> Result<MediaReference, ResolveError>;
}

impl<R: ContentResolver + ?Sized> ContentResolver for Box<R> {
    fn resolve(&self, query: &str) -> Result<MediaReference, ResolveError> {
        (**self).resolve(query)
    }
}
