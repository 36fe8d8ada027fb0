//! Playback settings. Deserialized as the `playback` table of the media config.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | button.line | 23 | BCM line of the stop button. |
//! | button.edge | falling | Edge that counts as a press. |
//! | button.bias | pull_up | Idle biasing so a press is an unambiguous transition. |
//! | player.backend | process | `process` (external player) or `rodio` (local files, feature `audio`). |
//! | player.program | cvlc | Player executable for the process backend. |
//! | player.args | --play-and-exit --intf dummy | Arguments placed before the media URI. |

use crate::gpio::{Bias, Edge};
use serde::{Deserialize, Serialize};

fn default_line() -> u8 {
    23
}

fn default_edge() -> Edge {
    Edge::Falling
}

fn default_bias() -> Bias {
    Bias::PullUp
}

fn default_program() -> String {
    "cvlc".to_string()
}

fn default_args() -> Vec<String> {
    vec![
        "--play-and-exit".to_string(),
        "--intf".to_string(),
        "dummy".to_string(),
    ]
}

/// Stop button line configuration. Applied once per process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSettings {
    #[serde(default = "default_line")]
    pub line: u8,
    #[serde(default = "default_edge")]
    pub edge: Edge,
    #[serde(default = "default_bias")]
    pub bias: Bias,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            line: default_line(),
            edge: default_edge(),
            bias: default_bias(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// External player process per session.
    #[default]
    Process,
    /// In-process rodio sink; local files only.
    Rodio,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSettings {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            program: default_program(),
            args: default_args(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    #[serde(default)]
    pub button: ButtonSettings,
    #[serde(default)]
    pub player: PlayerSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_aiy_button() {
        let s = PlaybackSettings::default();
        assert_eq!(s.button.line, 23);
        assert_eq!(s.button.edge, Edge::Falling);
        assert_eq!(s.button.bias, Bias::PullUp);
        assert_eq!(s.player.backend, BackendKind::Process);
        assert_eq!(s.player.program, "cvlc");
    }

    #[test]
    fn partial_table_keeps_remaining_defaults() {
        let s: PlaybackSettings = toml::from_str(
            r#"
            [button]
            line = 17
            edge = "rising"

            [player]
            program = "mpv"
            "#,
        )
        .unwrap();
        assert_eq!(s.button.line, 17);
        assert_eq!(s.button.edge, Edge::Rising);
        assert_eq!(s.button.bias, Bias::PullUp);
        assert_eq!(s.player.program, "mpv");
        assert_eq!(s.player.args, default_args());
    }
}
