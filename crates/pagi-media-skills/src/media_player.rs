//! **MediaPlayerCommand**: "<keyword> <query>" → resolve → announce → play until done.
//!
//! One implementation serves every media keyword; only the [`ContentResolver`] and the
//! prompts differ. The command blocks the dispatching thread for the whole session.

use crate::command::{strip_keyword, VoiceCommand};
use crate::config::MediaConfig;
use crate::resolver::{ContentResolver, ResolveError};
use crate::voice::VoiceSink;
use pagi_playback::{MediaReference, PlaybackController, SessionOutcome};
use std::sync::Arc;
use tracing::info;

/// Spoken text for every step. `{query}` and `{title}` are substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPrompts {
    pub missing_query: String,
    pub no_match: String,
    pub no_stream: String,
    pub lookup_failed: String,
    pub now_playing: String,
    pub cant_play: String,
    pub interrupted: String,
}

impl MediaPrompts {
    pub fn tunein(config: &MediaConfig) -> Self {
        let t = &config.tunein;
        Self {
            missing_query: t.missing_query_prompt.clone(),
            no_match: t.no_match_prompt.clone(),
            no_stream: t.no_stream_prompt.clone(),
            lookup_failed: t.no_match_prompt.clone(),
            now_playing: config.prompts.now_playing.clone(),
            cant_play: config.prompts.cant_play.clone(),
            interrupted: config.prompts.interrupted.clone(),
        }
    }

    pub fn youtube(config: &MediaConfig) -> Self {
        let y = &config.youtube;
        Self {
            missing_query: y.missing_query_prompt.clone(),
            no_match: y.not_found_prompt.clone(),
            no_stream: y.not_found_prompt.clone(),
            lookup_failed: y.not_found_prompt.clone(),
            now_playing: config.prompts.now_playing.clone(),
            cant_play: config.prompts.cant_play.clone(),
            interrupted: config.prompts.interrupted.clone(),
        }
    }

    pub fn not_found(&self, err: &ResolveError, query: &str) -> String {
        let template = match err {
            ResolveError::NoMatch(_) => &self.no_match,
            ResolveError::NoStream(_) => &self.no_stream,
            ResolveError::Lookup(_) => &self.lookup_failed,
        };
        render(template, query, "")
    }

    pub fn now_playing(&self, media: &MediaReference) -> String {
        render(&self.now_playing, "", media.title())
    }

    /// What to say once the session is over. Nothing after a natural end.
    pub fn after(&self, outcome: &SessionOutcome, media: &MediaReference) -> Option<String> {
        match outcome {
            SessionOutcome::Completed => None,
            SessionOutcome::Failed(_) => Some(render(&self.cant_play, "", media.title())),
            SessionOutcome::Interrupted => Some(render(&self.interrupted, "", media.title())),
        }
    }
}

fn render(template: &str, query: &str, title: &str) -> String {
    template.replace("{query}", query).replace("{title}", title)
}

pub struct MediaPlayerCommand<R> {
    keyword: String,
    resolver: R,
    controller: Arc<PlaybackController>,
    voice: Arc<dyn VoiceSink>,
    prompts: MediaPrompts,
}

impl<R: ContentResolver> MediaPlayerCommand<R> {
    pub fn new(
        keyword: impl Into<String>,
        resolver: R,
        controller: Arc<PlaybackController>,
        voice: Arc<dyn VoiceSink>,
        prompts: MediaPrompts,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            resolver,
            controller,
            voice,
            prompts,
        }
    }

    /// Resolve and play `query`. `None` when nothing reached the player.
    pub fn play_query(&self, query: &str) -> Option<SessionOutcome> {
        let query = query.trim();
        if query.is_empty() {
            info!(target: "pagi::media", keyword = %self.keyword, "no query given");
            self.voice.say(&self.prompts.missing_query);
            return None;
        }

        let media = match self.resolver.resolve(query) {
            Ok(media) => media,
            Err(e) => {
                info!(target: "pagi::media", keyword = %self.keyword, query, reason = %e, "nothing to play");
                self.voice.say(&self.prompts.not_found(&e, query));
                return None;
            }
        };

        // Announced before the backend confirms anything.
        self.voice.say(&self.prompts.now_playing(&media));
        let outcome = self.controller.play(&media);
        info!(target: "pagi::media", keyword = %self.keyword, title = media.title(), outcome = outcome.as_str(), "media command finished");

        if let Some(message) = self.prompts.after(&outcome, &media) {
            self.voice.say(&message);
        }
        Some(outcome)
    }
}

impl<R: ContentResolver> VoiceCommand for MediaPlayerCommand<R> {
    fn keyword(&self) -> &str {
        &self.keyword
    }

    fn run(&self, voice_command: &str) {
        let query = strip_keyword(voice_command, &self.keyword);
        self.play_query(&query);
    }
}
