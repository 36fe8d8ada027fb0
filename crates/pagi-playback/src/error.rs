//! Error types for the PAGI playback core

use thiserror::Error;

/// Result type alias for playback operations
pub type PlaybackResult<T> = Result<T, PlaybackError>;

/// Errors raised while wiring up or driving a playback session.
///
/// None of these escape [`PlaybackController::play`](crate::PlaybackController::play):
/// the session converts backend and hardware faults into a
/// [`SessionOutcome`](crate::SessionOutcome) at its boundary.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Interrupt already registered on line {0}")]
    RegistrationConflict(u8),

    #[error("GPIO error: {0}")]
    Gpio(String),

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio playback error: {0}")]
    Playback(String),

    #[error("Channel receive error: {0}")]
    ChannelReceive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "rpi")]
impl From<rppal::gpio::Error> for PlaybackError {
    fn from(err: rppal::gpio::Error) -> Self {
        PlaybackError::Gpio(err.to_string())
    }
}

#[cfg(feature = "audio")]
impl From<rodio::StreamError> for PlaybackError {
    fn from(err: rodio::StreamError) -> Self {
        PlaybackError::AudioDevice(err.to_string())
    }
}

#[cfg(feature = "audio")]
impl From<rodio::PlayError> for PlaybackError {
    fn from(err: rodio::PlayError) -> Self {
        PlaybackError::Playback(err.to_string())
    }
}

#[cfg(feature = "audio")]
impl From<rodio::decoder::DecoderError> for PlaybackError {
    fn from(err: rodio::decoder::DecoderError) -> Self {
        PlaybackError::Playback(format!("Decode failed: {}", err))
    }
}
