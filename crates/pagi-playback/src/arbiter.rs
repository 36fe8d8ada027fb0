//! **EventArbiter**: single-resolution meeting point for session-ending events.
//!
//! Producers (backend event thread, interrupt callback) hold cloned [`Resolver`]s and
//! may fire concurrently. The first `resolve` takes the oneshot sender; later calls
//! find the slot empty and return `false` without error. The consumer blocks on
//! [`Resolution::wait`] with no timeout and no polling.

use crate::error::{PlaybackError, PlaybackResult};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::debug;

/// Events that end a session. Every subscribed event is terminating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// Backend reached the natural end of the media.
    Ended,
    /// Backend reported a playback fault.
    Error(String),
    /// The stop button edge was observed while armed.
    Interrupted,
}

/// Create a connected resolver/resolution pair for one session.
pub fn channel() -> (Resolver, Resolution) {
    let (tx, rx) = oneshot::channel();
    (
        Resolver {
            slot: Arc::new(Mutex::new(Some(tx))),
        },
        Resolution { rx },
    )
}

/// Producer side. Cheap to clone; every clone writes to the same slot.
#[derive(Clone)]
pub struct Resolver {
    slot: Arc<Mutex<Option<oneshot::Sender<TerminalEvent>>>>,
}

impl Resolver {
    /// Deliver `event` if nothing has been delivered yet. Returns true only for the winning call.
    pub fn resolve(&self, event: TerminalEvent) -> bool {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        match sender {
            Some(tx) => {
                // Receiver gone means the session already returned; nothing observes this.
                let _ = tx.send(event);
                true
            }
            None => {
                debug!(?event, "arbiter: session already resolved, event discarded");
                false
            }
        }
    }

    /// True once some producer has won.
    pub fn is_resolved(&self) -> bool {
        self.slot
            .lock()
            .map(|slot| slot.is_none())
            .unwrap_or(true)
    }
}

/// Consumer side, owned by the waiting session.
pub struct Resolution {
    rx: oneshot::Receiver<TerminalEvent>,
}

impl Resolution {
    /// Block the calling thread until the first terminal event arrives.
    ///
    /// Fails only if every [`Resolver`] was dropped without resolving. Must not be
    /// called from inside an async runtime.
    pub fn wait(self) -> PlaybackResult<TerminalEvent> {
        self.rx.blocking_recv().map_err(|e| {
            PlaybackError::ChannelReceive(format!("all event sources dropped: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn first_write_wins() {
        let (resolver, resolution) = channel();
        assert!(resolver.resolve(TerminalEvent::Ended));
        assert!(!resolver.resolve(TerminalEvent::Error("late".into())));
        assert!(!resolver.clone().resolve(TerminalEvent::Interrupted));
        assert_eq!(resolution.wait().unwrap(), TerminalEvent::Ended);
    }

    #[test]
    fn writes_after_consumer_returned_are_harmless() {
        let (resolver, resolution) = channel();
        resolver.resolve(TerminalEvent::Interrupted);
        assert_eq!(resolution.wait().unwrap(), TerminalEvent::Interrupted);
        assert!(resolver.is_resolved());
        assert!(!resolver.resolve(TerminalEvent::Ended));
    }

    #[test]
    fn exactly_one_winner_among_racing_producers() {
        for _ in 0..50 {
            let (resolver, resolution) = channel();
            let producers: Vec<_> = (0..8)
                .map(|i| {
                    let r = resolver.clone();
                    thread::spawn(move || {
                        let event = match i % 3 {
                            0 => TerminalEvent::Ended,
                            1 => TerminalEvent::Error(format!("producer {}", i)),
                            _ => TerminalEvent::Interrupted,
                        };
                        r.resolve(event)
                    })
                })
                .collect();
            let wins = producers
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();
            assert_eq!(wins, 1);
            assert!(resolution.wait().is_ok());
        }
    }

    #[test]
    fn wait_blocks_until_delivery() {
        let (resolver, resolution) = channel();
        let started = std::time::Instant::now();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            resolver.resolve(TerminalEvent::Ended);
        });
        assert_eq!(resolution.wait().unwrap(), TerminalEvent::Ended);
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn dropped_producers_surface_as_error() {
        let (resolver, resolution) = channel();
        drop(resolver);
        assert!(matches!(
            resolution.wait(),
            Err(PlaybackError::ChannelReceive(_))
        ));
    }
}
