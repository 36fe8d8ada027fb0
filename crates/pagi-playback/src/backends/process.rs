//! External player process as the media engine (cvlc, mpv, ffplay ...).
//!
//! Each load spawns `program args... <uri>` on a dedicated watcher thread. The
//! watcher waits on either the child exiting or a stop signal, so neither side
//! polls. Exit status 0 is a natural end; anything else is an error.

use crate::backend::{BackendEvent, LifecycleHub, LifecycleListener, MediaBackend, SubscriptionId};
use crate::config::PlayerSettings;
use crate::media::MediaReference;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::thread;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

pub struct ProcessBackend {
    program: String,
    args: Vec<String>,
    hub: Arc<LifecycleHub>,
    // Dropping or firing the sender kills the running child.
    active: Mutex<Option<oneshot::Sender<()>>>,
}

impl ProcessBackend {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            hub: Arc::new(LifecycleHub::new()),
            active: Mutex::new(None),
        }
    }

    pub fn from_settings(settings: &PlayerSettings) -> Self {
        Self::new(settings.program.clone(), settings.args.clone())
    }

    fn take_active(&self) -> Option<oneshot::Sender<()>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

impl MediaBackend for ProcessBackend {
    fn load(&self, media: &MediaReference) {
        // One live child at a time.
        if let Some(previous) = self.take_active() {
            let _ = previous.send(());
        }

        let generation = self.hub.begin_load();
        let (stop_tx, stop_rx) = oneshot::channel();
        *self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(stop_tx);

        let job = PlayerJob {
            program: self.program.clone(),
            args: self.args.clone(),
            uri: media.uri().to_string(),
            generation,
            hub: Arc::clone(&self.hub),
        };
        let spawned = thread::Builder::new()
            .name("pagi-player".into())
            .spawn(move || job.run(stop_rx));
        if let Err(e) = spawned {
            self.hub.emit(
                generation,
                BackendEvent::EncounteredError(format!("player thread: {}", e)),
            );
        }
    }

    fn stop(&self) {
        self.hub.invalidate();
        if let Some(tx) = self.take_active() {
            // Err means the watcher already finished; nothing to kill.
            if tx.send(()).is_ok() {
                debug!(program = %self.program, "process backend: stop requested");
            }
        }
    }

    fn subscribe(&self, listener: LifecycleListener) -> SubscriptionId {
        self.hub.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.hub.unsubscribe(id);
    }
}

struct PlayerJob {
    program: String,
    args: Vec<String>,
    uri: String,
    generation: u64,
    hub: Arc<LifecycleHub>,
}

impl PlayerJob {
    fn run(self, stop_rx: oneshot::Receiver<()>) {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                self.hub.emit(
                    self.generation,
                    BackendEvent::EncounteredError(format!("player runtime: {}", e)),
                );
                return;
            }
        };

        if let Some(event) = rt.block_on(self.supervise(stop_rx)) {
            self.hub.emit(self.generation, event);
        }
    }

    async fn supervise(&self, stop_rx: oneshot::Receiver<()>) -> Option<BackendEvent> {
        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .arg(&self.uri)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %self.program, error = %e, "process backend: spawn failed");
                return Some(BackendEvent::EncounteredError(format!(
                    "failed to start {}: {}",
                    self.program, e
                )));
            }
        };
        info!(program = %self.program, uri = %self.uri, pid = ?child.id(), "process backend: player started");

        tokio::select! {
            status = child.wait() => Some(match status {
                Ok(status) if status.success() => BackendEvent::EndReached,
                Ok(status) => BackendEvent::EncounteredError(format!("{} exited with {}", self.program, status)),
                Err(e) => BackendEvent::EncounteredError(format!("waiting on {}: {}", self.program, e)),
            }),
            // Fired or dropped sender: either way the session no longer wants this child.
            _ = stop_rx => {
                if let Err(e) = child.kill().await {
                    warn!(program = %self.program, error = %e, "process backend: kill failed");
                }
                debug!(program = %self.program, "process backend: player killed");
                None
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn recorder(backend: &ProcessBackend) -> mpsc::UnboundedReceiver<BackendEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        backend.subscribe(Arc::new(move |event: BackendEvent| {
            let _ = tx.send(event);
        }));
        rx
    }

    #[test]
    fn clean_exit_is_end_reached() {
        let backend = ProcessBackend::new("true", Vec::new());
        let mut rx = recorder(&backend);
        backend.load(&MediaReference::new("ignored", "t"));
        assert_eq!(rx.blocking_recv(), Some(BackendEvent::EndReached));
    }

    #[test]
    fn failing_exit_is_error() {
        let backend = ProcessBackend::new("false", Vec::new());
        let mut rx = recorder(&backend);
        backend.load(&MediaReference::new("ignored", "t"));
        assert!(matches!(
            rx.blocking_recv(),
            Some(BackendEvent::EncounteredError(_))
        ));
    }

    #[test]
    fn missing_program_is_error() {
        let backend = ProcessBackend::new("/nonexistent/pagi-player", Vec::new());
        let mut rx = recorder(&backend);
        backend.load(&MediaReference::new("stream://ok", "t"));
        match rx.blocking_recv() {
            Some(BackendEvent::EncounteredError(reason)) => {
                assert!(reason.contains("failed to start"))
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn stop_kills_without_emitting() {
        let backend = ProcessBackend::new("sleep", Vec::new());
        let mut rx = recorder(&backend);
        backend.load(&MediaReference::new("30", "long"));
        std::thread::sleep(Duration::from_millis(100));
        backend.stop();
        backend.stop();
        std::thread::sleep(Duration::from_millis(200));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stop_without_media_is_noop() {
        let backend = ProcessBackend::new("true", Vec::new());
        backend.stop();
        backend.stop();
    }
}
