//! Digital input capability: one edge-triggered line with fixed polarity and idle bias.
//!
//! Adapters:
//! - [`SimulatedInput`]: in-memory line for tests and headless runs
//! - `RppalInput`: Raspberry Pi GPIO (feature `rpi`)

mod simulated;

#[cfg(feature = "rpi")]
mod rpi;

pub use simulated::SimulatedInput;

#[cfg(feature = "rpi")]
pub use rpi::RppalInput;

use crate::error::PlaybackResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Transition that counts as a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    /// Level the line sits at right after a genuine press.
    pub fn active_level(self) -> Level {
        match self {
            Edge::Rising => Level::High,
            Edge::Falling => Level::Low,
        }
    }
}

/// Idle-state biasing applied when the line is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    PullUp,
    PullDown,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Called from the interrupt context with the line number and the level sampled at delivery.
pub type EdgeCallback = Arc<dyn Fn(u8, Level) + Send + Sync>;

/// Platform GPIO as seen by the interrupt monitor. Configured once per process.
pub trait DigitalInput: Send + Sync {
    /// Configure `line` as an input with `bias` and register `callback` for `edge`.
    ///
    /// Returns [`PlaybackError::RegistrationConflict`](crate::PlaybackError::RegistrationConflict)
    /// when the line already has an edge registration.
    fn configure_edge_trigger(
        &self,
        line: u8,
        edge: Edge,
        bias: Bias,
        callback: EdgeCallback,
    ) -> PlaybackResult<()>;

    /// Attach an additional callback to an existing registration.
    fn on_edge(&self, line: u8, callback: EdgeCallback) -> PlaybackResult<()>;
}
