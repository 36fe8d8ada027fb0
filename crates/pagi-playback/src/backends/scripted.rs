//! Deterministic backend: replays a script of lifecycle events instead of playing audio.

use crate::backend::{BackendEvent, LifecycleHub, LifecycleListener, MediaBackend, SubscriptionId};
use crate::media::MediaReference;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// What the backend does after each `load`.
#[derive(Debug, Clone)]
pub enum Script {
    /// Emit nothing; playback runs until stopped.
    Hold,
    /// Emit each event after its delay (delays are relative to the previous event).
    Events(Vec<(Duration, BackendEvent)>),
    /// Emit an error synchronously, inside `load`.
    FailOnLoad(String),
}

impl Script {
    pub fn end_after(delay: Duration) -> Self {
        Script::Events(vec![(delay, BackendEvent::EndReached)])
    }

    pub fn fail_after(delay: Duration, reason: impl Into<String>) -> Self {
        Script::Events(vec![(delay, BackendEvent::EncounteredError(reason.into()))])
    }
}

/// Backend for tests and dry runs. Counts `load`/`stop` and remembers what was loaded.
pub struct ScriptedBackend {
    hub: Arc<LifecycleHub>,
    script: Mutex<Script>,
    loads: AtomicUsize,
    stops: AtomicUsize,
    loaded: Mutex<Vec<MediaReference>>,
}

impl ScriptedBackend {
    pub fn new(script: Script) -> Self {
        Self {
            hub: Arc::new(LifecycleHub::new()),
            script: Mutex::new(script),
            loads: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            loaded: Mutex::new(Vec::new()),
        }
    }

    /// Replace the script used by subsequent loads.
    pub fn set_script(&self, script: Script) {
        *self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = script;
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn loaded(&self) -> Vec<MediaReference> {
        self.loaded
            .lock()
            .map(|l| l.clone())
            .unwrap_or_default()
    }

    pub fn listener_count(&self) -> usize {
        self.hub.listener_count()
    }
}

impl MediaBackend for ScriptedBackend {
    fn load(&self, media: &MediaReference) {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.loaded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(media.clone());
        let generation = self.hub.begin_load();
        let script = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        debug!(generation, ?script, uri = media.uri(), "scripted backend: load");

        match script {
            Script::Hold => {}
            Script::FailOnLoad(reason) => {
                self.hub
                    .emit(generation, BackendEvent::EncounteredError(reason));
            }
            Script::Events(events) => {
                let hub = Arc::clone(&self.hub);
                let spawned = thread::Builder::new()
                    .name("pagi-scripted-backend".into())
                    .spawn(move || {
                        for (delay, event) in events {
                            thread::sleep(delay);
                            hub.emit(generation, event);
                        }
                    });
                if let Err(e) = spawned {
                    warn!(error = %e, "scripted backend: event thread failed to start");
                    self.hub.emit(
                        generation,
                        BackendEvent::EncounteredError(format!("event thread: {}", e)),
                    );
                }
            }
        }
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.hub.invalidate();
    }

    fn subscribe(&self, listener: LifecycleListener) -> SubscriptionId {
        self.hub.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.hub.unsubscribe(id);
    }
}
