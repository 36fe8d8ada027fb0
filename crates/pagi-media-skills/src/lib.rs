//! # PAGI Media Skills - Voice Command Media Plugins
//!
//! Keyword-triggered commands for a voice assistant: TuneIn radio, YouTube audio and
//! space station sightings. Media commands share one
//! [`PlaybackController`](pagi_playback::PlaybackController), so the stop button
//! interrupts whichever of them is playing.
//!
//! ```text
//! "tunein wnyc" ─► CommandRegistry ─► MediaPlayerCommand<TuneInResolver>
//!                                        │ resolve ─► "Now playing WNYC"
//!                                        │ PlaybackController::play (blocks)
//!                                        └ outcome ─► "Can't play ..." / "Stopped"
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod media_player;
pub mod resolver;
pub mod space_station;
pub mod tunein;
pub mod voice;
pub mod youtube;

pub use command::{strip_keyword, CommandRegistry, VoiceCommand};
pub use config::{
    MediaConfig, PromptSettings, SpaceStationSettings, TuneInSettings, VoiceMode, VoiceSettings,
    YouTubeSettings,
};
pub use error::{SkillError, SkillResult};
pub use media_player::{MediaPlayerCommand, MediaPrompts};
pub use resolver::{ContentResolver, ResolveError};
pub use space_station::{SpaceStationReply, StationQuestion};
pub use tunein::{Station, TuneInResolver};
#[cfg(feature = "audio")]
pub use voice::TtsVoice;
pub use voice::{build_voice, LogVoice, OpenRouterTts, PlaceholderTts, TtsBackend, VoiceSink};
pub use youtube::YouTubeResolver;

use pagi_playback::PlaybackController;
use std::sync::Arc;

/// Register the `tunein` keyword.
pub fn register_tunein(
    registry: &mut CommandRegistry,
    config: &MediaConfig,
    controller: Arc<PlaybackController>,
    voice: Arc<dyn VoiceSink>,
) -> SkillResult<()> {
    let resolver = TuneInResolver::from_settings(&config.tunein)?;
    registry.register(Arc::new(MediaPlayerCommand::new(
        config.tunein.keyword.clone(),
        resolver,
        controller,
        voice,
        MediaPrompts::tunein(config),
    )));
    Ok(())
}

/// Register the `youtube` keyword.
pub fn register_youtube(
    registry: &mut CommandRegistry,
    config: &MediaConfig,
    controller: Arc<PlaybackController>,
    voice: Arc<dyn VoiceSink>,
) {
    registry.register(Arc::new(MediaPlayerCommand::new(
        config.youtube.keyword.clone(),
        YouTubeResolver::from_settings(&config.youtube),
        controller,
        voice,
        MediaPrompts::youtube(config),
    )));
}

/// Register every space station phrase. All of them answer the "where" question.
pub fn register_space_station(
    registry: &mut CommandRegistry,
    settings: &SpaceStationSettings,
    voice: Arc<dyn VoiceSink>,
) {
    let settings = Arc::new(settings.clone());
    for keyword in &settings.keywords {
        registry.register(Arc::new(SpaceStationReply::new(
            keyword.clone(),
            StationQuestion::Where,
            Arc::clone(&voice),
            Arc::clone(&settings),
        )));
    }
}

/// Everything, in dispatch order.
pub fn register_all(
    registry: &mut CommandRegistry,
    config: &MediaConfig,
    controller: Arc<PlaybackController>,
    voice: Arc<dyn VoiceSink>,
) -> SkillResult<()> {
    register_tunein(registry, config, Arc::clone(&controller), Arc::clone(&voice))?;
    register_youtube(registry, config, controller, Arc::clone(&voice));
    register_space_station(registry, &config.space_station, voice);
    Ok(())
}
