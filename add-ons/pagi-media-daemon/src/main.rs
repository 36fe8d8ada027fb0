//! PAGI Media Daemon
//!
//! Reads already-transcribed voice commands from stdin, one per line, and dispatches
//! them to the media plugins. A command that plays media blocks until the media ends,
//! fails, or the stop button is pressed. Typing `stop` while something plays presses
//! the simulated button.

use anyhow::Context;
use pagi_media_skills::{build_voice, register_all, CommandRegistry, MediaConfig};
use pagi_playback::{
    BackendKind, DigitalInput, InterruptMonitor, MediaBackend, PlaybackController, PlayerSettings,
    ProcessBackend, SimulatedInput,
};
use std::io::BufRead;
use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const STOP_COMMAND: &str = "stop";

/// Where stop-button edges come from.
enum StopButton {
    Simulated(SimulatedInput),
    #[cfg(feature = "rpi")]
    Gpio(pagi_playback::RppalInput),
}

impl StopButton {
    /// GPIO when built with `rpi`, unless `PAGI_MEDIA_SIMULATED_BUTTON` is set.
    fn open() -> anyhow::Result<Self> {
        #[cfg(feature = "rpi")]
        {
            if std::env::var_os("PAGI_MEDIA_SIMULATED_BUTTON").is_none() {
                let gpio = pagi_playback::RppalInput::new().context("open GPIO")?;
                return Ok(StopButton::Gpio(gpio));
            }
        }
        Ok(StopButton::Simulated(SimulatedInput::new()))
    }

    fn input(&self) -> &dyn DigitalInput {
        match self {
            StopButton::Simulated(input) => input,
            #[cfg(feature = "rpi")]
            StopButton::Gpio(input) => input,
        }
    }

    fn press(&self, line: u8) {
        match self {
            StopButton::Simulated(input) => {
                let delivered = input.press(line);
                info!(line, delivered, "⏹️ simulated stop button pressed");
            }
            #[cfg(feature = "rpi")]
            StopButton::Gpio(_) => {
                warn!(line, "stop button is on GPIO; press the hardware button");
            }
        }
    }
}

fn build_backend(settings: &PlayerSettings) -> anyhow::Result<Arc<dyn MediaBackend>> {
    match settings.backend {
        BackendKind::Process => {
            info!(program = %settings.program, args = ?settings.args, "media backend: external player");
            Ok(Arc::new(ProcessBackend::from_settings(settings)))
        }
        #[cfg(feature = "audio")]
        BackendKind::Rodio => {
            info!("media backend: rodio (local files)");
            let output = pagi_playback::AudioOutput::open_default().context("open audio output")?;
            Ok(Arc::new(pagi_playback::RodioBackend::new(output)))
        }
        #[cfg(not(feature = "audio"))]
        BackendKind::Rodio => {
            anyhow::bail!("player.backend = \"rodio\" needs pagi-media-daemon built with --features audio")
        }
    }
}

/// Forward stdin lines to the dispatcher, except `stop`, which is handled here so it
/// works while a command is blocking the dispatcher.
fn spawn_stdin_reader(
    tx: mpsc::UnboundedSender<String>,
    button: Arc<StopButton>,
    line: u8,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("pagi-stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for text in stdin.lock().lines() {
                let text = match text {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "stdin read failed");
                        break;
                    }
                };
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if text.eq_ignore_ascii_case(STOP_COMMAND) {
                    button.press(line);
                } else if tx.send(text.to_string()).is_err() {
                    break;
                }
            }
            info!("stdin closed");
        })
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[pagi-media-daemon] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MediaConfig::load().context("load media config")?;

    let button = Arc::new(StopButton::open()?);
    let monitor = InterruptMonitor::init_global(button.input(), &config.playback.button)
        .context("install stop button")?;
    let backend = build_backend(&config.playback.player)?;
    let controller = Arc::new(PlaybackController::new(backend, monitor));
    let voice = build_voice(&config.voice).context("build voice output")?;

    let mut registry = CommandRegistry::new();
    register_all(&mut registry, &config, controller, voice).context("register commands")?;

    info!(
        keywords = ?registry.keywords(),
        button_line = config.playback.button.line,
        "PAGI media daemon ready; type a command (\"stop\" to interrupt playback)"
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_stdin_reader(tx, Arc::clone(&button), config.playback.button.line)?;

    // Commands run one at a time on this thread; that is what serializes playback.
    while let Some(text) = rx.blocking_recv() {
        if !registry.dispatch(&text) {
            info!(text = %text, "no command matched");
        }
    }

    info!("PAGI media daemon shutting down");
    Ok(())
}
