//! The process-wide monitor registers with the hardware exactly once.
//!
//! Lives in its own test binary so no other test can initialize the global first.

use pagi_playback::{ButtonSettings, InterruptMonitor, SimulatedInput};
use std::sync::Arc;

#[test]
fn test_global_monitor_initializes_once() {
    assert!(InterruptMonitor::global().is_none());

    let input = SimulatedInput::new();
    let settings = ButtonSettings::default();
    let first = InterruptMonitor::init_global(&input, &settings).expect("first init");

    // A second init neither fails nor adds another callback to the line.
    let other_input = SimulatedInput::new();
    let second = InterruptMonitor::init_global(&other_input, &settings).expect("second init");
    assert!(Arc::ptr_eq(&first, &second));
    assert!(!other_input.is_configured(settings.line));
    assert_eq!(input.press(settings.line), 1);

    let global = InterruptMonitor::global().expect("global set");
    assert!(Arc::ptr_eq(&first, &global));
}
