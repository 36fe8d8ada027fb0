//! Raspberry Pi GPIO via `rppal`. BCM pin numbering.

use super::{Bias, DigitalInput, Edge, EdgeCallback, Level};
use crate::error::{PlaybackError, PlaybackResult};
use rppal::gpio::{self, Gpio, InputPin, Trigger};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

struct Line {
    // Dropping the pin cancels the async interrupt.
    _pin: InputPin,
    callbacks: Arc<Mutex<Vec<EdgeCallback>>>,
}

/// Edge-triggered inputs on the Pi header. Each line is registered at most once;
/// extra subscribers attach through [`DigitalInput::on_edge`].
pub struct RppalInput {
    gpio: Gpio,
    lines: Mutex<HashMap<u8, Line>>,
}

impl RppalInput {
    pub fn new() -> PlaybackResult<Self> {
        let gpio = Gpio::new()?;
        Ok(Self {
            gpio,
            lines: Mutex::new(HashMap::new()),
        })
    }
}

fn to_level(level: gpio::Level) -> Level {
    match level {
        gpio::Level::Low => Level::Low,
        gpio::Level::High => Level::High,
    }
}

impl DigitalInput for RppalInput {
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

        let pin = self.gpio.get(line)?;
        let mut pin = match bias {
            Bias::PullUp => pin.into_input_pullup(),
            Bias::PullDown => pin.into_input_pulldown(),
            Bias::Off => pin.into_input(),
        };
        let trigger = match edge {
            Edge::Rising => Trigger::RisingEdge,
            Edge::Falling => Trigger::FallingEdge,
        };

        let callbacks = Arc::new(Mutex::new(vec![callback]));
        let dispatch = Arc::clone(&callbacks);
        pin.set_async_interrupt(trigger, move |level| {
            let snapshot: Vec<EdgeCallback> = match dispatch.lock() {
                Ok(cbs) => cbs.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            };
            for cb in &snapshot {
                cb(line, to_level(level));
            }
        })?;

        info!(line, ?edge, ?bias, "GPIO: edge interrupt registered");
        lines.insert(
            line,
            Line {
                _pin: pin,
                callbacks,
            },
        );
        Ok(())
    }

    fn on_edge(&self, line: u8, callback: EdgeCallback) -> PlaybackResult<()> {
        let lines = self
            .lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = lines
            .get(&line)
            .ok_or_else(|| PlaybackError::Gpio(format!("line {} has no edge registration", line)))?;
        entry
            .callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(callback);
        Ok(())
    }
}
