//! **Voice output**: what the plugins speak back.
//!
//! [`VoiceSink::say`] is fire-and-forget: synthesis or device failures are logged and
//! swallowed so a broken speaker never aborts a command. Speech is synchronous, so a
//! "Now playing" prompt has finished before the stream starts.

use crate::config::VoiceSettings;
use crate::error::{SkillError, SkillResult};
use std::sync::Arc;
use tracing::info;

pub trait VoiceSink: Send + Sync {
    fn say(&self, text: &str);
}

/// Headless voice: every utterance goes to the log.
#[derive(Debug, Default)]
pub struct LogVoice;

impl VoiceSink for LogVoice {
    fn say(&self, text: &str) {
        info!(target: "pagi::voice", text, "🗣️ say");
    }
}

/// Backend that turns text into encoded audio (WAV/MP3). Empty output means "nothing to play".
pub trait TtsBackend: Send + Sync {
    fn synthesize(&self, text: &str) -> SkillResult<Vec<u8>>;
}

/// Returns empty audio; speech is effectively logged only.
#[derive(Debug, Default)]
pub struct PlaceholderTts;

impl TtsBackend for PlaceholderTts {
    fn synthesize(&self, _text: &str) -> SkillResult<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// OpenAI-compatible `/audio/speech` endpoint (OpenAI, OpenRouter, local servers).
#[derive(Debug, Clone)]
pub struct OpenRouterTts {
    /// Base URL without trailing slash (e.g. https://api.openai.com/v1).
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub voice: String,
    client: reqwest::blocking::Client,
}

impl OpenRouterTts {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        voice: impl Into<String>,
    ) -> SkillResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            voice: voice.into(),
            client,
        })
    }

    /// Endpoint, model and voice from settings; the key from `TTS_API_KEY`
    /// (or `OPENROUTER_API_KEY`).
    pub fn from_settings(settings: &VoiceSettings) -> SkillResult<Self> {
        let api_key = std::env::var("TTS_API_KEY")
            .or_else(|_| std::env::var("OPENROUTER_API_KEY"))
            .map_err(|_| SkillError::Tts("TTS requires TTS_API_KEY or OPENROUTER_API_KEY".to_string()))?;
        Self::new(
            settings.api_url.clone(),
            api_key,
            settings.model.clone(),
            settings.voice.clone().unwrap_or_else(|| "shimmer".to_string()),
        )
    }
}

impl TtsBackend for OpenRouterTts {
    fn synthesize(&self, text: &str) -> SkillResult<Vec<u8>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/audio/speech", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(SkillError::Tts(format!("TTS API error {}: {}", status, body)));
        }
        Ok(res.bytes()?.to_vec())
    }
}

#[cfg(feature = "audio")]
pub use speaker::TtsVoice;

#[cfg(feature = "audio")]
mod speaker {
    use super::{TtsBackend, VoiceSink};
    use crate::error::{SkillError, SkillResult};
    use pagi_playback::AudioOutput;
    use rodio::Source;
    use std::io::Cursor;
    use tracing::{debug, info, warn};

    /// Synthesizes with a [`TtsBackend`] and plays on the default device, blocking
    /// until the utterance has been heard.
    pub struct TtsVoice {
        tts: Box<dyn TtsBackend>,
        output: AudioOutput,
    }

    impl TtsVoice {
        pub fn new(tts: Box<dyn TtsBackend>, output: AudioOutput) -> Self {
            Self { tts, output }
        }

        fn speak(&self, text: &str) -> SkillResult<()> {
            let bytes = self.tts.synthesize(text)?;
            if bytes.is_empty() {
                debug!(target: "pagi::voice", text, "TTS returned no audio");
                return Ok(());
            }
            let source = rodio::Decoder::new(Cursor::new(bytes))
                .map_err(|e| SkillError::Tts(format!("Decode failed: {}", e)))?;
            let sink = self.output.new_sink()?;
            sink.append(source.convert_samples::<f32>());
            sink.sleep_until_end();
            Ok(())
        }
    }

    impl VoiceSink for TtsVoice {
        fn say(&self, text: &str) {
            info!(target: "pagi::voice", text, "🗣️ say");
            if let Err(e) = self.speak(text) {
                warn!(target: "pagi::voice", error = %e, text, "speech failed");
            }
        }
    }
}

/// Voice for `settings`: [`LogVoice`] unless speech is configured and available.
pub fn build_voice(settings: &VoiceSettings) -> SkillResult<Arc<dyn VoiceSink>> {
    use crate::config::VoiceMode;

    match settings.mode {
        VoiceMode::Log => Ok(Arc::new(LogVoice)),
        #[cfg(feature = "audio")]
        VoiceMode::Openai => {
            let tts = OpenRouterTts::from_settings(settings)?;
            let output = pagi_playback::AudioOutput::open_default()?;
            Ok(Arc::new(TtsVoice::new(Box::new(tts), output)))
        }
        #[cfg(not(feature = "audio"))]
        VoiceMode::Openai => {
            tracing::warn!(target: "pagi::voice", "speech output needs the `audio` feature; logging instead");
            Ok(Arc::new(LogVoice))
        }
    }
}
