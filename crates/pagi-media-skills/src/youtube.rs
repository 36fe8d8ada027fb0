//! **YouTube**: best-audio stream for the top search hit, via a yt-dlp compatible extractor.

use crate::config::YouTubeSettings;
use crate::resolver::{ContentResolver, ResolveError};
use once_cell::sync::Lazy;
use pagi_playback::MediaReference;
use regex::Regex;
use serde::Deserialize;
use std::process::{Command, Stdio};
use tracing::{error, info};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap_or_else(|_| unreachable!()));

#[derive(Debug, Deserialize)]
struct ExtractorInfo {
    #[serde(default)]
    entries: Option<Vec<Option<TrackInfo>>>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrackInfo {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Title reduced to its words, joined by single spaces. Underscores at the edges of a
/// word are dropped ("__Baby_Songs__ (HD)" becomes "Baby_Songs HD").
pub fn clean_title(raw: &str) -> String {
    WORD_RE
        .find_iter(raw)
        .map(|m| m.as_str().trim_matches('_'))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Media reference from the extractor's `--dump-single-json` output.
///
/// A search yields a playlist whose first entry is the hit; a direct link yields the
/// video object itself.
pub fn parse_extractor_output(query: &str, json: &str) -> Result<MediaReference, ResolveError> {
    let info: ExtractorInfo = serde_json::from_str(json)
        .map_err(|e| ResolveError::Lookup(format!("extractor output: {}", e)))?;

    let (url, title) = match info.entries {
        Some(entries) => {
            let track = entries
                .into_iter()
                .next()
                .flatten()
                .ok_or_else(|| ResolveError::NoMatch(query.to_string()))?;
            (track.url, track.title)
        }
        None => (info.url, info.title),
    };

    let title = title
        .map(|t| clean_title(&t))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| query.to_string());
    let url = url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ResolveError::NoStream(title.clone()))?;
    Ok(MediaReference::new(url, title))
}

pub struct YouTubeResolver {
    program: String,
}

impl YouTubeResolver {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_settings(settings: &YouTubeSettings) -> Self {
        Self::new(settings.program.clone())
    }

    fn extractor_args(query: &str) -> Vec<&str> {
        vec![
            "--dump-single-json",
            "--default-search",
            "ytsearch1:",
            "--format",
            "bestaudio/best",
            "--no-playlist",
            "--quiet",
            "--no-warnings",
            "--",
            query,
        ]
    }
}

impl ContentResolver for YouTubeResolver {
    fn resolve(&self, query: &str) -> Result<MediaReference, ResolveError> {
        info!(target: "pagi::youtube", query, "searching for track");
        let output = Command::new(&self.program)
            .args(Self::extractor_args(query))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                error!(target: "pagi::youtube", program = %self.program, error = %e, "extractor failed to start");
                ResolveError::Lookup(format!("{}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(target: "pagi::youtube", query, status = %output.status, stderr = %stderr.trim(), "extractor failed");
            return Err(ResolveError::Lookup(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        let media = parse_extractor_output(query, &String::from_utf8_lossy(&output.stdout))?;
        info!(target: "pagi::youtube", title = media.title(), "resolved track");
        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_keeps_words_only() {
        assert_eq!(
            clean_title("Kendrick Lamar - HUMBLE. (Official Video)"),
            "Kendrick Lamar HUMBLE Official Video"
        );
        assert_eq!(clean_title("__Baby_Songs__ (HD)"), "Baby_Songs HD");
        assert_eq!(clean_title("___ !!!"), "");
        assert_eq!(clean_title("Café   Olé"), "Café Olé");
    }

    #[test]
    fn search_output_uses_first_entry() {
        let json = r#"{"_type":"playlist","entries":[{"url":"https://rr1.example/audio","title":"Baby Songs | Nursery"},{"url":"https://other","title":"x"}]}"#;
        let media = parse_extractor_output("baby songs", json).unwrap();
        assert_eq!(media.uri(), "https://rr1.example/audio");
        assert_eq!(media.title(), "Baby Songs Nursery");
    }

    #[test]
    fn direct_video_output_is_accepted() {
        let json = r#"{"url":"https://rr1.example/v","title":"Humble"}"#;
        let media = parse_extractor_output("humble", json).unwrap();
        assert_eq!(media.title(), "Humble");
    }

    #[test]
    fn empty_or_null_entries_are_no_match() {
        assert_eq!(
            parse_extractor_output("nothing", r#"{"entries":[]}"#),
            Err(ResolveError::NoMatch("nothing".into()))
        );
        assert_eq!(
            parse_extractor_output("nothing", r#"{"entries":[null]}"#),
            Err(ResolveError::NoMatch("nothing".into()))
        );
    }

    #[test]
    fn entry_without_url_is_no_stream() {
        let json = r#"{"entries":[{"title":"Live Only"}]}"#;
        assert_eq!(
            parse_extractor_output("live", json),
            Err(ResolveError::NoStream("Live Only".into()))
        );
    }

    #[test]
    fn missing_extractor_is_a_lookup_error() {
        let resolver = YouTubeResolver::new("/nonexistent/yt-dlp");
        assert!(matches!(resolver.resolve("humble"), Err(ResolveError::Lookup(_))));
    }

    #[cfg(unix)]
    #[test]
    fn failing_extractor_is_a_lookup_error() {
        let resolver = YouTubeResolver::new("false");
        assert!(matches!(resolver.resolve("humble"), Err(ResolveError::Lookup(_))));
    }
}
