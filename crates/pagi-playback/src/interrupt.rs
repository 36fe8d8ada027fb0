//! **InterruptMonitor**: the stop button as a session-scoped cancellation signal.
//!
//! The hardware registration is made once per process. Sessions only toggle
//! *delivery*: [`InterruptMonitor::arm`] parks the session's [`Resolver`], and the
//! returned [`InterruptSubscription`] clears it again on disarm (or drop). A press
//! while nothing is armed is dropped; there is no backlog.

use crate::arbiter::{Resolver, TerminalEvent};
use crate::config::ButtonSettings;
use crate::error::{PlaybackError, PlaybackResult};
use crate::gpio::{DigitalInput, Edge, EdgeCallback, Level};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

static GLOBAL_MONITOR: OnceCell<Arc<InterruptMonitor>> = OnceCell::new();

#[derive(Default)]
struct ArmState {
    next_token: AtomicU64,
    armed: Mutex<Option<(u64, Resolver)>>,
}

impl ArmState {
    fn clear_if(&self, token: u64) -> bool {
        let mut armed = self
            .armed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let owned = matches!(armed.as_ref(), Some((current, _)) if *current == token);
        if owned {
            *armed = None;
        }
        owned
    }
}

/// Watches one edge-triggered line and resolves the armed session on a press.
pub struct InterruptMonitor {
    line: u8,
    edge: Edge,
    state: Arc<ArmState>,
}

impl InterruptMonitor {
    /// Register the edge callback on `input`.
    ///
    /// A registration conflict (line already has an edge handler) is recovered by
    /// attaching to the existing registration instead.
    pub fn install(input: &dyn DigitalInput, settings: &ButtonSettings) -> PlaybackResult<Self> {
        let state = Arc::new(ArmState::default());
        let callback = edge_callback(Arc::clone(&state), settings.edge);

        match input.configure_edge_trigger(
            settings.line,
            settings.edge,
            settings.bias,
            Arc::clone(&callback),
        ) {
            Ok(()) => {
                info!(line = settings.line, edge = ?settings.edge, bias = ?settings.bias, "InterruptMonitor: edge detection registered");
            }
            Err(PlaybackError::RegistrationConflict(line)) => {
                info!(line, "InterruptMonitor: event already added, attaching callback");
                input.on_edge(line, callback)?;
            }
            Err(e) => return Err(e),
        }

        Ok(Self {
            line: settings.line,
            edge: settings.edge,
            state,
        })
    }

    /// Process-wide monitor. The first call installs it; later calls return the same
    /// instance and never touch the hardware again.
    pub fn init_global(
        input: &dyn DigitalInput,
        settings: &ButtonSettings,
    ) -> PlaybackResult<Arc<Self>> {
        GLOBAL_MONITOR
            .get_or_try_init(|| Self::install(input, settings).map(Arc::new))
            .map(Arc::clone)
    }

    /// The process-wide monitor, if [`init_global`](Self::init_global) has run.
    pub fn global() -> Option<Arc<Self>> {
        GLOBAL_MONITOR.get().cloned()
    }

    pub fn line(&self) -> u8 {
        self.line
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// Route the next press to `resolver` until the subscription is disarmed.
    pub fn arm(&self, resolver: Resolver) -> InterruptSubscription {
        let token = self.state.next_token.fetch_add(1, Ordering::Relaxed);
        let previous = self
            .state
            .armed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace((token, resolver));
        if previous.is_some() {
            warn!(line = self.line, "InterruptMonitor: armed while another session was still armed");
        }
        debug!(line = self.line, token, "InterruptMonitor: armed");
        InterruptSubscription {
            token,
            state: Arc::clone(&self.state),
            active: true,
        }
    }

    /// Stop routing presses to the session behind `subscription`.
    pub fn disarm(&self, subscription: InterruptSubscription) {
        subscription.disarm();
    }

    pub fn is_armed(&self) -> bool {
        self.state
            .armed
            .lock()
            .map(|armed| armed.is_some())
            .unwrap_or(false)
    }
}

fn edge_callback(state: Arc<ArmState>, edge: Edge) -> EdgeCallback {
    let active: Level = edge.active_level();
    Arc::new(move |line: u8, level: Level| {
        if level != active {
            debug!(line, ?level, "InterruptMonitor: edge with idle level ignored");
            return;
        }
        let armed = state
            .armed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        match armed {
            Some((token, resolver)) => {
                info!(line, token, "⏹️ Stop button pressed");
                resolver.resolve(TerminalEvent::Interrupted);
            }
            None => debug!(line, "InterruptMonitor: press while disarmed dropped"),
        }
    })
}

/// Session-scoped interrupt delivery. Disarms on drop.
pub struct InterruptSubscription {
    token: u64,
    state: Arc<ArmState>,
    active: bool,
}

impl InterruptSubscription {
    pub fn disarm(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if self.state.clear_if(self.token) {
            debug!(token = self.token, "InterruptMonitor: disarmed");
        }
    }
}

impl Drop for InterruptSubscription {
    fn drop(&mut self) {
        self.release();
    }
}
