//! Session Test: end-to-end playback sessions against scripted and process backends.
//!
//! Covers the three ways a session can end (natural end, backend error, stop button)
//! and checks that each one leaves the backend and the button in a clean state.
//!
//! Run with: `cargo test -p pagi-playback --test session_test`

use pagi_playback::{
    BackendEvent, Bias, ButtonSettings, Edge, FailureReason, InterruptMonitor, MediaBackend,
    MediaReference, PlaybackController, Script, ScriptedBackend, SessionOutcome, SimulatedInput,
};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const BUTTON: u8 = 23;

struct Rig {
    input: Arc<SimulatedInput>,
    backend: Arc<ScriptedBackend>,
    controller: PlaybackController,
}

fn rig(script: Script) -> Rig {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .try_init();

    let input = Arc::new(SimulatedInput::new());
    let settings = ButtonSettings {
        line: BUTTON,
        edge: Edge::Falling,
        bias: Bias::PullUp,
    };
    let monitor = Arc::new(InterruptMonitor::install(input.as_ref(), &settings).expect("install monitor"));
    let backend = Arc::new(ScriptedBackend::new(script));
    let controller = PlaybackController::new(backend.clone() as Arc<dyn MediaBackend>, monitor);
    Rig {
        input,
        backend,
        controller,
    }
}

/// Press the button once the session has armed the monitor.
fn press_when_armed(rig: &Rig, delay: Duration) -> thread::JoinHandle<()> {
    let input = Arc::clone(&rig.input);
    let monitor = Arc::clone(rig.controller.monitor());
    thread::spawn(move || {
        while !monitor.is_armed() {
            thread::sleep(Duration::from_millis(5));
        }
        thread::sleep(delay);
        input.press(BUTTON);
    })
}

fn track() -> MediaReference {
    MediaReference::new("http://example.com/stream.mp3", "Test Track")
}

#[test]
fn test_empty_reference_fails_without_touching_backend() {
    let rig = rig(Script::Hold);

    let outcome = rig.controller.play(&MediaReference::new("", "Nothing"));
    assert_eq!(outcome, SessionOutcome::Failed(FailureReason::NoInput));

    let outcome = rig.controller.play(&MediaReference::new("   ", "Blank"));
    assert_eq!(outcome, SessionOutcome::Failed(FailureReason::NoInput));

    assert_eq!(rig.backend.load_count(), 0);
    assert_eq!(rig.backend.stop_count(), 0);
    assert!(!rig.controller.monitor().is_armed());
}

#[test]
fn test_natural_end_completes_without_stop() {
    let rig = rig(Script::end_after(Duration::from_millis(30)));

    let outcome = rig.controller.play(&track());

    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(rig.backend.load_count(), 1);
    assert_eq!(rig.backend.stop_count(), 0);
    assert_eq!(rig.backend.loaded(), vec![track()]);
    assert!(!rig.controller.is_playing());
}

#[test]
fn test_first_event_wins_over_later_error() {
    let rig = rig(Script::Events(vec![
        (Duration::from_millis(20), BackendEvent::EndReached),
        (Duration::ZERO, BackendEvent::EncounteredError("late".into())),
    ]));

    assert_eq!(rig.controller.play(&track()), SessionOutcome::Completed);
    thread::sleep(Duration::from_millis(20));
    assert_eq!(rig.backend.stop_count(), 0);
}

#[test]
fn test_stop_button_interrupts_playback() {
    let rig = rig(Script::Hold);
    let presser = press_when_armed(&rig, Duration::from_millis(100));

    let started = Instant::now();
    let outcome = rig.controller.play(&track());
    presser.join().unwrap();

    assert_eq!(outcome, SessionOutcome::Interrupted);
    assert!(started.elapsed() >= Duration::from_millis(100));
    assert_eq!(rig.backend.stop_count(), 1);
    assert!(!rig.controller.monitor().is_armed());
}

#[test]
fn test_interrupt_beats_pending_end() {
    let rig = rig(Script::end_after(Duration::from_millis(500)));
    let presser = press_when_armed(&rig, Duration::from_millis(20));

    let outcome = rig.controller.play(&track());
    presser.join().unwrap();
    assert_eq!(outcome, SessionOutcome::Interrupted);

    // The end event the stopped load would have sent is dropped.
    thread::sleep(Duration::from_millis(600));
    assert_eq!(rig.backend.stop_count(), 1);
}

#[test]
fn test_press_between_sessions_is_ignored() {
    let rig = rig(Script::end_after(Duration::from_millis(20)));
    assert_eq!(rig.controller.play(&track()), SessionOutcome::Completed);

    // Nothing armed: the press reaches the callback and is dropped.
    assert_eq!(rig.input.press(BUTTON), 1);

    rig.backend.set_script(Script::end_after(Duration::from_millis(50)));
    assert_eq!(rig.controller.play(&track()), SessionOutcome::Completed);
    assert_eq!(rig.backend.stop_count(), 0);
}

#[test]
fn test_glitch_does_not_stop_playback() {
    let rig = rig(Script::end_after(Duration::from_millis(80)));
    let input = Arc::clone(&rig.input);
    let monitor = Arc::clone(rig.controller.monitor());
    let glitcher = thread::spawn(move || {
        while !monitor.is_armed() {
            thread::sleep(Duration::from_millis(5));
        }
        input.glitch(BUTTON);
    });

    assert_eq!(rig.controller.play(&track()), SessionOutcome::Completed);
    glitcher.join().unwrap();
}

#[test]
fn test_error_during_load_fails_session() {
    let rig = rig(Script::FailOnLoad("unsupported codec".into()));

    let outcome = rig.controller.play(&track());

    assert_eq!(
        outcome,
        SessionOutcome::Failed(FailureReason::Backend("unsupported codec".into()))
    );
    assert_eq!(rig.backend.stop_count(), 1);
}

#[test]
fn test_error_mid_playback_stops_once() {
    let rig = rig(Script::fail_after(Duration::from_millis(30), "stream dropped"));

    let outcome = rig.controller.play(&track());

    assert!(matches!(outcome, SessionOutcome::Failed(FailureReason::Backend(ref r)) if r == "stream dropped"));
    assert_eq!(rig.backend.stop_count(), 1);
}

#[test]
fn test_session_releases_backend_listener() {
    let rig = rig(Script::end_after(Duration::from_millis(10)));
    for _ in 0..3 {
        assert_eq!(rig.controller.play(&track()), SessionOutcome::Completed);
    }
    assert_eq!(rig.backend.listener_count(), 0);
    assert_eq!(rig.backend.load_count(), 3);
}

#[cfg(unix)]
#[test]
fn test_stop_button_kills_player_process() {
    use pagi_playback::ProcessBackend;

    let input = Arc::new(SimulatedInput::new());
    let monitor = Arc::new(
        InterruptMonitor::install(input.as_ref(), &ButtonSettings::default()).expect("install monitor"),
    );
    let backend: Arc<dyn MediaBackend> = Arc::new(ProcessBackend::new("sleep", Vec::new()));
    let controller = PlaybackController::new(backend, Arc::clone(&monitor));

    let line = monitor.line();
    let presser = {
        let input = Arc::clone(&input);
        let monitor = Arc::clone(&monitor);
        thread::spawn(move || {
            while !monitor.is_armed() {
                thread::sleep(Duration::from_millis(5));
            }
            thread::sleep(Duration::from_millis(100));
            input.press(line);
        })
    };

    let started = Instant::now();
    let outcome = controller.play(&MediaReference::new("30", "Long Silence"));
    presser.join().unwrap();

    assert_eq!(outcome, SessionOutcome::Interrupted);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[cfg(unix)]
#[test]
fn test_player_process_natural_end() {
    use pagi_playback::ProcessBackend;

    let input = SimulatedInput::new();
    let monitor = Arc::new(
        InterruptMonitor::install(&input, &ButtonSettings::default()).expect("install monitor"),
    );
    let controller = PlaybackController::new(Arc::new(ProcessBackend::new("true", Vec::new())), monitor);

    assert_eq!(
        controller.play(&MediaReference::new("file:///dev/null", "Nothing Much")),
        SessionOutcome::Completed
    );
}

#[cfg(feature = "audio")]
#[test]
#[ignore] // Requires an audio device and PAGI_TEST_AUDIO_FILE pointing at a short clip
fn test_rodio_backend_plays_local_file() {
    use pagi_playback::{AudioOutput, RodioBackend};

    let path = std::env::var("PAGI_TEST_AUDIO_FILE").expect("PAGI_TEST_AUDIO_FILE");
    let output = AudioOutput::open_default().expect("Failed to open audio device");
    let input = SimulatedInput::new();
    let monitor = Arc::new(
        InterruptMonitor::install(&input, &ButtonSettings::default()).expect("install monitor"),
    );
    let controller = PlaybackController::new(Arc::new(RodioBackend::new(output)), monitor);

    let outcome = controller.play(&MediaReference::new(format!("file://{}", path), "Clip"));
    assert_eq!(outcome, SessionOutcome::Completed);

    let missing = controller.play(&MediaReference::new("file:///nonexistent.mp3", "Missing"));
    assert!(matches!(missing, SessionOutcome::Failed(FailureReason::Backend(_))));
}
