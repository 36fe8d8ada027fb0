//! # PAGI Playback - Interruptible Media Sessions
//!
//! Plays one media item at a time and blocks the caller until the item ends,
//! fails, or a hardware stop button is pressed. Whichever happens first decides the
//! outcome; everything after it is ignored.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PlaybackController                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐      │
//! │  │ MediaBackend │→ │   Arbiter    │← │  Interrupt   │      │
//! │  │ (cvlc/rodio) │  │ (first wins) │  │   Monitor    │      │
//! │  └──────────────┘  └──────────────┘  └──────────────┘      │
//! │         ↑                 ↓                  ↑              │
//! │       load          SessionOutcome     DigitalInput        │
//! │       stop                             (rppal / sim)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod arbiter;
pub mod backend;
pub mod backends;
pub mod config;
pub mod error;
pub mod gpio;
pub mod interrupt;
pub mod media;
#[cfg(feature = "audio")]
pub mod output;
pub mod session;

pub use arbiter::{Resolution, Resolver, TerminalEvent};
pub use backend::{BackendEvent, LifecycleHub, LifecycleListener, MediaBackend, SubscriptionId};
pub use backends::{ProcessBackend, Script, ScriptedBackend};
#[cfg(feature = "audio")]
pub use backends::RodioBackend;
pub use config::{BackendKind, ButtonSettings, PlaybackSettings, PlayerSettings};
pub use error::{PlaybackError, PlaybackResult};
pub use gpio::{Bias, DigitalInput, Edge, EdgeCallback, Level, SimulatedInput};
#[cfg(feature = "rpi")]
pub use gpio::RppalInput;
pub use interrupt::{InterruptMonitor, InterruptSubscription};
pub use media::{FailureReason, MediaReference, SessionOutcome};
#[cfg(feature = "audio")]
pub use output::AudioOutput;
pub use session::{PlaybackController, PlaybackSession, SessionReport};
