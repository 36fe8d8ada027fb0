//! Default audio output device, shared by local-file playback and speech.
//!
//! `rodio::OutputStream` is not `Send`, so it lives on a parked owner thread for as
//! long as any [`AudioOutput`] clone is alive. Only the `Send + Sync` stream handle
//! crosses threads.

use crate::error::{PlaybackError, PlaybackResult};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Keeps the device open until the last clone is dropped.
struct StreamKeeper {
    _shutdown: oneshot::Sender<()>,
}

#[derive(Clone)]
pub struct AudioOutput {
    handle: OutputStreamHandle,
    _keeper: Arc<StreamKeeper>,
}

impl AudioOutput {
    /// Open the default output device.
    pub fn open_default() -> PlaybackResult<Self> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        thread::Builder::new()
            .name("pagi-audio-out".into())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = ready_tx.send(Ok(handle));
                    // Returns once the keeper's sender is dropped.
                    let _ = shutdown_rx.blocking_recv();
                    drop(stream);
                    info!("AudioOutput: device closed");
                }
                Err(e) => {
                    warn!(error = %e, "AudioOutput: no output device");
                    let _ = ready_tx.send(Err(e));
                }
            })?;

        let handle = ready_rx
            .blocking_recv()
            .map_err(|e| PlaybackError::ChannelReceive(e.to_string()))??;
        info!("🔊 AudioOutput: default device ready");
        Ok(Self {
            handle,
            _keeper: Arc::new(StreamKeeper {
                _shutdown: shutdown_tx,
            }),
        })
    }

    /// Fresh sink on this device.
    pub fn new_sink(&self) -> PlaybackResult<Sink> {
        Ok(Sink::try_new(&self.handle)?)
    }
}
