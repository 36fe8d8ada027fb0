//! In-memory digital input. Use for tests and for running without a button.

use super::{Bias, DigitalInput, Edge, EdgeCallback, Level};
use crate::error::{PlaybackError, PlaybackResult};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

struct Registration {
    edge: Edge,
    callbacks: Vec<EdgeCallback>,
}

/// Simulated edge-triggered lines. Callbacks run on the thread that calls `press`/`glitch`.
///
/// Mirrors the kernel behaviour the monitor has to cope with: a second
/// `configure_edge_trigger` on the same line is rejected.
#[derive(Default)]
pub struct SimulatedInput {
    lines: Mutex<HashMap<u8, Registration>>,
}

impl SimulatedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a genuine press on `line` (edge followed by the active level).
    /// Returns the number of callbacks invoked.
    pub fn press(&self, line: u8) -> usize {
        self.fire(line, |edge| edge.active_level())
    }

    /// Emit an edge whose sampled level is back at idle (contact bounce).
    pub fn glitch(&self, line: u8) -> usize {
        self.fire(line, |edge| match edge.active_level() {
            Level::Low => Level::High,
            Level::High => Level::Low,
        })
    }

    pub fn is_configured(&self, line: u8) -> bool {
        self.lines
            .lock()
            .map(|lines| lines.contains_key(&line))
            .unwrap_or(false)
    }

    fn fire(&self, line: u8, level_for: impl Fn(Edge) -> Level) -> usize {
        let (level, callbacks) = {
            let lines = self
                .lines
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            match lines.get(&line) {
                Some(reg) => (level_for(reg.edge), reg.callbacks.clone()),
                None => {
                    debug!(line, "simulated input: edge on unconfigured line");
                    return 0;
                }
            }
        };
        for cb in &callbacks {
            cb(line, level);
        }
        callbacks.len()
    }
}

impl DigitalInput for SimulatedInput {
    fn configure_edge_trigger(
        &self,
        line: u8,
        edge: Edge,
        bias: Bias,
        callback: EdgeCallback,
    ) -> PlaybackResult<()> {
        let mut lines = self
            .lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if lines.contains_key(&line) {
            return Err(PlaybackError::RegistrationConflict(line));
        }
        debug!(line, ?edge, ?bias, "simulated input: line configured");
        lines.insert(
            line,
            Registration {
                edge,
                callbacks: vec![callback],
            },
        );
        Ok(())
    }

    fn on_edge(&self, line: u8, callback: EdgeCallback) -> PlaybackResult<()> {
        let mut lines = self
            .lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let reg = lines
            .get_mut(&line)
            .ok_or_else(|| PlaybackError::Gpio(format!("line {} has no edge registration", line)))?;
        reg.callbacks.push(callback);
        Ok(())
    }
}
