//! Keyword command registry.
//!
//! The speech front end hands over already-transcribed text. The first registered
//! command whose keyword appears in the text (case-insensitive) runs on the
//! caller's thread and may block for as long as it plays.

use std::sync::Arc;
use tracing::{debug, info};

/// A command triggered by a spoken keyword.
pub trait VoiceCommand: Send + Sync {
    /// Trigger phrase, matched case-insensitively anywhere in the utterance.
    fn keyword(&self) -> &str;

    /// Handle the full utterance. Speaks its own replies; never fails.
    fn run(&self, voice_command: &str);
}

/// Ordered command table. Registration order decides ties.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<dyn VoiceCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Arc<dyn VoiceCommand>) {
        info!(target: "pagi::commands", keyword = command.keyword(), "registered keyword");
        self.commands.push(command);
    }

    pub fn keywords(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.keyword()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// First command whose keyword occurs in `text`.
    pub fn find(&self, text: &str) -> Option<&Arc<dyn VoiceCommand>> {
        let lowered = text.to_lowercase();
        self.commands
            .iter()
            .find(|c| lowered.contains(&c.keyword().to_lowercase()))
    }

    /// Run the matching command. Returns false when no keyword matched.
    pub fn dispatch(&self, text: &str) -> bool {
        match self.find(text) {
            Some(command) => {
                debug!(target: "pagi::commands", keyword = command.keyword(), text, "dispatching");
                command.run(text);
                true
            }
            None => {
                debug!(target: "pagi::commands", text, "no keyword matched");
                false
            }
        }
    }
}

/// The utterance with the first occurrence of `keyword` removed, lower-cased and trimmed.
pub fn strip_keyword(text: &str, keyword: &str) -> String {
    text.to_lowercase()
        .replacen(&keyword.to_lowercase(), "", 1)
        .trim()
        .to_string()
}
