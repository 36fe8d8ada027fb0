//! Local file playback on a rodio sink.

use crate::backend::{BackendEvent, LifecycleHub, LifecycleListener, MediaBackend, SubscriptionId};
use crate::error::{PlaybackError, PlaybackResult};
use crate::media::MediaReference;
use crate::output::AudioOutput;
use rodio::{Decoder, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, info};

/// Plays `file://` URIs or bare paths. Anything rodio cannot open or decode is
/// reported as [`BackendEvent::EncounteredError`].
pub struct RodioBackend {
    output: AudioOutput,
    hub: Arc<LifecycleHub>,
    current: Mutex<Option<Arc<Sink>>>,
}

impl RodioBackend {
    pub fn new(output: AudioOutput) -> Self {
        Self {
            output,
            hub: Arc::new(LifecycleHub::new()),
            current: Mutex::new(None),
        }
    }

    fn open_sink(&self, uri: &str) -> PlaybackResult<Sink> {
        let path = uri.strip_prefix("file://").unwrap_or(uri);
        let file = File::open(path)
            .map_err(|e| PlaybackError::Playback(format!("{}: {}", path, e)))?;
        let source = Decoder::new(BufReader::new(file))?;
        let sink = self.output.new_sink()?;
        sink.append(source.convert_samples::<f32>());
        Ok(sink)
    }

    fn take_current(&self) -> Option<Arc<Sink>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

impl MediaBackend for RodioBackend {
    fn load(&self, media: &MediaReference) {
        if let Some(previous) = self.take_current() {
            previous.stop();
        }
        let generation = self.hub.begin_load();

        let sink = match self.open_sink(media.uri()) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                self.hub
                    .emit(generation, BackendEvent::EncounteredError(e.to_string()));
                return;
            }
        };
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::clone(&sink));
        info!(uri = media.uri(), "rodio backend: playing");

        let hub = Arc::clone(&self.hub);
        let spawned = thread::Builder::new()
            .name("pagi-rodio-watch".into())
            .spawn(move || {
                sink.sleep_until_end();
                // Stale after stop(); the hub drops it.
                hub.emit(generation, BackendEvent::EndReached);
            });
        if let Err(e) = spawned {
            self.hub.emit(
                generation,
                BackendEvent::EncounteredError(format!("watch thread: {}", e)),
            );
        }
    }

    fn stop(&self) {
        self.hub.invalidate();
        if let Some(sink) = self.take_current() {
            sink.stop();
            debug!("rodio backend: sink stopped");
        }
    }

    fn subscribe(&self, listener: LifecycleListener) -> SubscriptionId {
        self.hub.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.hub.unsubscribe(id);
    }
}
