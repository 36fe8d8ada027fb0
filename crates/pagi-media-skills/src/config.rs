//! Media plugin configuration.
//!
//! Precedence: env `PAGI_MEDIA_*` > TOML file (`PAGI_MEDIA_CONFIG`, default
//! `config/media`) > built-in defaults. Nested keys use `__` in the environment,
//! e.g. `PAGI_MEDIA_TUNEIN__BASE_URL` or `PAGI_MEDIA_PLAYBACK__BUTTON__LINE`.

use pagi_playback::PlaybackSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config/media";

fn default_tunein_keyword() -> String {
    "tunein".to_string()
}

fn default_tunein_base_url() -> String {
    "http://tunein.com/".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_station_prompt() -> String {
    "Please specify a station".to_string()
}

fn default_no_station_prompt() -> String {
    "Didn't find any stations".to_string()
}

fn default_no_stream_prompt() -> String {
    "Didn't find any streams".to_string()
}

fn default_youtube_keyword() -> String {
    "youtube".to_string()
}

fn default_extractor() -> String {
    "yt-dlp".to_string()
}

fn default_song_prompt() -> String {
    "Please specify a song".to_string()
}

fn default_not_found_prompt() -> String {
    "Failed to find {query}".to_string()
}

fn default_now_playing() -> String {
    "Now playing {title}".to_string()
}

fn default_cant_play() -> String {
    "Can't play {title}".to_string()
}

fn default_interrupted() -> String {
    "Stopped".to_string()
}

fn default_space_station_keywords() -> Vec<String> {
    [
        "where is the space station",
        "when space station",
        "is there space station",
        "space station fly",
        "space station pass",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_next_viewing() -> String {
    "It looks like the next viewings are tonight at 9:02 PM and tomorrow at 10:01 PM".to_string()
}

fn default_apology() -> String {
    "Sorry I couldn't look that up for the Space Station".to_string()
}

fn default_tts_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

/// Radio station lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuneInSettings {
    #[serde(default = "default_tunein_keyword")]
    pub keyword: String,
    /// Site root; must end with `/`.
    #[serde(default = "default_tunein_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_station_prompt")]
    pub missing_query_prompt: String,
    #[serde(default = "default_no_station_prompt")]
    pub no_match_prompt: String,
    #[serde(default = "default_no_stream_prompt")]
    pub no_stream_prompt: String,
}

impl Default for TuneInSettings {
    fn default() -> Self {
        Self {
            keyword: default_tunein_keyword(),
            base_url: default_tunein_base_url(),
            timeout_secs: default_timeout_secs(),
            missing_query_prompt: default_station_prompt(),
            no_match_prompt: default_no_station_prompt(),
            no_stream_prompt: default_no_stream_prompt(),
        }
    }
}

/// Track search through an external extractor (yt-dlp compatible CLI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YouTubeSettings {
    #[serde(default = "default_youtube_keyword")]
    pub keyword: String,
    #[serde(default = "default_extractor")]
    pub program: String,
    #[serde(default = "default_song_prompt")]
    pub missing_query_prompt: String,
    /// Spoken for every lookup failure. `{query}` is replaced with the search text.
    #[serde(default = "default_not_found_prompt")]
    pub not_found_prompt: String,
}

impl Default for YouTubeSettings {
    fn default() -> Self {
        Self {
            keyword: default_youtube_keyword(),
            program: default_extractor(),
            missing_query_prompt: default_song_prompt(),
            not_found_prompt: default_not_found_prompt(),
        }
    }
}

/// Prompts shared by every media command. `{title}` is replaced with the media title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSettings {
    #[serde(default = "default_now_playing")]
    pub now_playing: String,
    #[serde(default = "default_cant_play")]
    pub cant_play: String,
    #[serde(default = "default_interrupted")]
    pub interrupted: String,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            now_playing: default_now_playing(),
            cant_play: default_cant_play(),
            interrupted: default_interrupted(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceStationSettings {
    #[serde(default = "default_space_station_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_next_viewing")]
    pub next_viewing: String,
    #[serde(default = "default_apology")]
    pub apology: String,
}

impl Default for SpaceStationSettings {
    fn default() -> Self {
        Self {
            keywords: default_space_station_keywords(),
            next_viewing: default_next_viewing(),
            apology: default_apology(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceMode {
    /// Log spoken text only (headless).
    #[default]
    Log,
    /// OpenAI-compatible speech API played on the default device (feature `audio`).
    Openai,
}

/// Voice output. The API key is never read from the file; see `TTS_API_KEY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSettings {
    #[serde(default)]
    pub mode: VoiceMode,
    #[serde(default = "default_tts_url")]
    pub api_url: String,
    #[serde(default = "default_tts_model")]
    pub model: String,
    #[serde(default)]
    pub voice: Option<String>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            mode: VoiceMode::default(),
            api_url: default_tts_url(),
            model: default_tts_model(),
            voice: None,
        }
    }
}

/// Everything the media plugins and the daemon need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default)]
    pub playback: PlaybackSettings,
    #[serde(default)]
    pub tunein: TuneInSettings,
    #[serde(default)]
    pub youtube: YouTubeSettings,
    #[serde(default)]
    pub prompts: PromptSettings,
    #[serde(default)]
    pub space_station: SpaceStationSettings,
    #[serde(default)]
    pub voice: VoiceSettings,
}

impl MediaConfig {
    /// Load config from file and environment. The file is optional.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("PAGI_MEDIA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::build(config::File::with_name(&config_path).required(false))
    }

    /// Load from an explicit file (must exist), still applying env overrides.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::build(config::File::from(path).required(true))
    }

    fn build(
        file: config::File<config::FileSourceFile, config::FileFormat>,
    ) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("PAGI_MEDIA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
