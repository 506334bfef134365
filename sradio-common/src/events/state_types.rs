//! Player state type definitions
//!
//! The two independent state facets published by the playback engine.

use serde::{Deserialize, Serialize};

/// Asset-loading and buffering health, independent of play/pause intent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum PlayerState {
    /// No stream URL is set
    #[default]
    UrlNotSet,
    /// Asset validation or buffering in progress
    Loading,
    /// Item reported ready to play
    ReadyToPlay,
    /// Buffer is likely to keep up
    LoadingFinished,
    /// Asset unplayable or item failed
    Error,
}

impl PlayerState {
    /// Short human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            PlayerState::UrlNotSet => "URL is not set",
            PlayerState::Loading => "Loading",
            PlayerState::ReadyToPlay => "Ready to play",
            PlayerState::LoadingFinished => "Loading finished",
            PlayerState::Error => "Error",
        }
    }
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerState::UrlNotSet => write!(f, "urlNotSet"),
            PlayerState::Loading => write!(f, "loading"),
            PlayerState::ReadyToPlay => write!(f, "readyToPlay"),
            PlayerState::LoadingFinished => write!(f, "loadingFinished"),
            PlayerState::Error => write!(f, "error"),
        }
    }
}

/// Playback state enumeration (user/engine intent)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl PlaybackState {
    /// Short human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            PlaybackState::Playing => "Player is playing",
            PlaybackState::Paused => "Player is paused",
            PlaybackState::Stopped => "Player is stopped",
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Stopped => write!(f, "stopped"),
        }
    }
}
