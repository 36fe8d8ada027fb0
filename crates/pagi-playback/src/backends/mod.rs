//! Concrete [`MediaBackend`](crate::MediaBackend) adapters.

mod process;
mod scripted;

#[cfg(feature = "audio")]
mod rodio_sink;

pub use process::ProcessBackend;
pub use scripted::{Script, ScriptedBackend};

#[cfg(feature = "audio")]
pub use rodio_sink::RodioBackend;
