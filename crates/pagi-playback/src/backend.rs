//! Media backend capability and the lifecycle fan-out shared by every adapter.
//!
//! A backend starts media fire-and-forget and reports how it went only through
//! lifecycle events delivered on its own threads. [`LifecycleHub`] keeps the
//! subscriber list and a load generation so that events from an earlier load
//! never reach a later session.

use crate::media::MediaReference;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Lifecycle notifications emitted by a media engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Playback reached the natural end of the media.
    EndReached,
    /// Playback could not start or broke off.
    EncounteredError(String),
}

/// Callback invoked on the backend's event thread.
pub type LifecycleListener = Arc<dyn Fn(BackendEvent) + Send + Sync>;

/// Handle returned by [`MediaBackend::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Playback engine driven by a session.
///
/// Implementations must be callable from any thread. `stop` must be idempotent and a
/// no-op when nothing is loaded.
pub trait MediaBackend: Send + Sync {
    /// Load `media` and begin playing. Never reports failure here; faults arrive as
    /// [`BackendEvent::EncounteredError`].
    fn load(&self, media: &MediaReference);

    /// Stop whatever is playing.
    fn stop(&self);

    /// Receive `EndReached` / `EncounteredError` for subsequent loads.
    fn subscribe(&self, listener: LifecycleListener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Subscriber list plus load generation, embedded by backend adapters.
#[derive(Default)]
pub struct LifecycleHub {
    generation: AtomicU64,
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, LifecycleListener)>>,
}

impl LifecycleHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: LifecycleListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|(existing, _)| *existing != id);
    }

    /// Start a new load. Events tagged with an older generation are dropped from now on.
    pub fn begin_load(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Invalidate the current load (used by `stop`).
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    /// Deliver `event` for load `generation`. Returns false when the load is stale.
    pub fn emit(&self, generation: u64, event: BackendEvent) -> bool {
        // The generation is checked under the listener lock: `stop` invalidates
        // before a session unsubscribes, so a stale load never sees a newer listener.
        let listeners: Vec<LifecycleListener> = {
            let guard = self
                .listeners
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if !self.is_current(generation) {
                drop(guard);
                debug!(generation, ?event, "backend: stale lifecycle event dropped");
                return false;
            }
            guard.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in listeners {
            listener(event.clone());
        }
        true
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .map(|l| l.len())
            .unwrap_or_default()
    }
}
