//! Canned answers about International Space Station sightings.

use crate::command::VoiceCommand;
use crate::config::SpaceStationSettings;
use crate::voice::VoiceSink;
use std::sync::Arc;
use tracing::error;

/// Which question a keyword stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationQuestion {
    /// Where/when the station can next be seen.
    Where,
    Other(String),
}

impl From<&str> for StationQuestion {
    fn from(command: &str) -> Self {
        match command {
            "where" => StationQuestion::Where,
            other => StationQuestion::Other(other.to_string()),
        }
    }
}

pub struct SpaceStationReply {
    keyword: String,
    question: StationQuestion,
    voice: Arc<dyn VoiceSink>,
    settings: Arc<SpaceStationSettings>,
}

impl SpaceStationReply {
    pub fn new(
        keyword: impl Into<String>,
        question: StationQuestion,
        voice: Arc<dyn VoiceSink>,
        settings: Arc<SpaceStationSettings>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            question,
            voice,
            settings,
        }
    }
}

impl VoiceCommand for SpaceStationReply {
    fn keyword(&self) -> &str {
        &self.keyword
    }

    fn run(&self, _voice_command: &str) {
        match &self.question {
            StationQuestion::Where => self.voice.say(&self.settings.next_viewing),
            StationQuestion::Other(command) => {
                error!(target: "pagi::space_station", command = %command, "could not determine command");
                self.voice.say(&self.settings.apology);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Transcript(Mutex<Vec<String>>);

    impl VoiceSink for Transcript {
        fn say(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    #[test]
    fn where_speaks_next_viewing_and_unknown_apologizes() {
        let voice = Arc::new(Transcript::default());
        let settings = Arc::new(SpaceStationSettings::default());

        SpaceStationReply::new("space station fly", "where".into(), voice.clone(), settings.clone())
            .run("when does the space station fly over");
        SpaceStationReply::new("space station", "orbit".into(), voice.clone(), settings.clone())
            .run("space station");

        let lines = voice.0.lock().unwrap().clone();
        assert_eq!(lines, vec![settings.next_viewing.clone(), settings.apology.clone()]);
    }
}
