//! **PlaybackSession**: one blocking playback attempt.
//!
//! ```text
//!   play(media) ──► subscribe backend ─┐
//!                   arm interrupt ─────┼──► Resolver (first write wins)
//!                   backend.load ──────┘          │
//!                                                 ▼
//!                   Resolution::wait  ◄── Ended | Error | Interrupted
//!                   stop (if still live), disarm, unsubscribe
//!                   ─► SessionOutcome
//! ```
//!
//! The wait is the only suspension point. There is no timeout: a session ends only
//! through one of the three terminal events.

use crate::arbiter::{self, Resolver, TerminalEvent};
use crate::backend::{BackendEvent, LifecycleListener, MediaBackend};
use crate::interrupt::InterruptMonitor;
use crate::media::{FailureReason, MediaReference, SessionOutcome};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Long-lived owner of the backend and the interrupt monitor. One per process,
/// shared by every plugin that plays media.
pub struct PlaybackController {
    backend: Arc<dyn MediaBackend>,
    monitor: Arc<InterruptMonitor>,
    active: AtomicBool,
    sessions: AtomicU64,
}

impl PlaybackController {
    pub fn new(backend: Arc<dyn MediaBackend>, monitor: Arc<InterruptMonitor>) -> Self {
        Self {
            backend,
            monitor,
            active: AtomicBool::new(false),
            sessions: AtomicU64::new(0),
        }
    }

    /// Play `media` and block until it completes, fails, or the stop button is pressed.
    ///
    /// Precondition: callers serialize `play`. Overlapping calls are reported, not prevented.
    pub fn play(&self, media: &MediaReference) -> SessionOutcome {
        if !media.is_resolved() {
            info!(title = media.title(), "playback: rejected unresolved media");
            return SessionOutcome::Failed(FailureReason::NoInput);
        }

        let _active = ActiveGuard::enter(&self.active);
        let id = self.sessions.fetch_add(1, Ordering::Relaxed) + 1;
        let session = PlaybackSession::new(id, media.clone());
        let report = session.run(self.backend.as_ref(), &self.monitor);
        info!(
            session = report.id,
            title = media.title(),
            outcome = report.outcome.as_str(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "playback: session ended"
        );
        report.outcome
    }

    pub fn is_playing(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn monitor(&self) -> &Arc<InterruptMonitor> {
        &self.monitor
    }
}

struct ActiveGuard<'a>(&'a AtomicBool);

impl<'a> ActiveGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        let was_active = flag.swap(true, Ordering::AcqRel);
        if was_active {
            error!("playback: play() called while another session is unresolved");
        }
        debug_assert!(!was_active, "concurrent playback sessions are not supported");
        Self(flag)
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Result of one session, with timing for logs and tests.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub id: u64,
    pub outcome: SessionOutcome,
    pub elapsed: Duration,
}

/// Transient state of a single playback attempt. Consumed by [`run`](Self::run); never reused.
pub struct PlaybackSession {
    id: u64,
    media: MediaReference,
}

impl PlaybackSession {
    pub fn new(id: u64, media: MediaReference) -> Self {
        Self { id, media }
    }

    /// Drive the session to its single outcome, cleaning up on every exit path.
    pub fn run(self, backend: &dyn MediaBackend, monitor: &InterruptMonitor) -> SessionReport {
        let started = Instant::now();
        let (resolver, resolution) = arbiter::channel();

        // Subscribe before load: a backend that fails inside `load` must still reach the arbiter.
        let subscription = backend.subscribe(lifecycle_listener(resolver.clone()));
        let interrupt = monitor.arm(resolver);

        info!(session = self.id, title = self.media.title(), uri = self.media.uri(), "▶️ playback: starting");
        backend.load(&self.media);

        let event = match resolution.wait() {
            Ok(event) => event,
            Err(e) => {
                warn!(session = self.id, error = %e, "playback: event sources closed");
                TerminalEvent::Error(e.to_string())
            }
        };
        debug!(session = self.id, ?event, "playback: terminal event");

        let outcome = match event {
            TerminalEvent::Ended => SessionOutcome::Completed,
            TerminalEvent::Error(reason) => SessionOutcome::Failed(FailureReason::Backend(reason)),
            TerminalEvent::Interrupted => SessionOutcome::Interrupted,
        };

        // Natural end means the backend already stopped itself.
        if !outcome.is_completed() {
            debug!(session = self.id, "playback: stopping backend");
            backend.stop();
        }
        monitor.disarm(interrupt);
        backend.unsubscribe(subscription);

        SessionReport {
            id: self.id,
            outcome,
            elapsed: started.elapsed(),
        }
    }
}

fn lifecycle_listener(resolver: Resolver) -> LifecycleListener {
    Arc::new(move |event: BackendEvent| {
        let terminal = match event {
            BackendEvent::EndReached => TerminalEvent::Ended,
            BackendEvent::EncounteredError(reason) => TerminalEvent::Error(reason),
        };
        resolver.resolve(terminal);
    })
}
