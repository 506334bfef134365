//! Delegate that records notifications in order

use sradio_common::{PlaybackState, PlayerState};
use sradio_player::PlayerDelegate;
use std::sync::{Arc, Mutex};
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    PlayerState(PlayerState),
    PlaybackState(PlaybackState),
    Stream(Option<Url>),
    Metadata(Option<String>, Option<String>),
    Artwork(Option<Url>),
}

#[derive(Clone, Default)]
pub struct RecordingDelegate {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.log.lock().unwrap().clone()
    }

    pub fn player_states(&self) -> Vec<PlayerState> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::PlayerState(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn playback_states(&self) -> Vec<PlaybackState> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::PlaybackState(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn artwork(&self) -> Vec<Option<Url>> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Artwork(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    fn push(&self, notification: Notification) {
        self.log.lock().unwrap().push(notification);
    }
}

impl PlayerDelegate for RecordingDelegate {
    fn on_player_state_changed(&mut self, state: PlayerState) {
        self.push(Notification::PlayerState(state));
    }

    fn on_playback_state_changed(&mut self, state: PlaybackState) {
        self.push(Notification::PlaybackState(state));
    }

    fn on_stream_changed(&mut self, url: Option<&Url>) {
        self.push(Notification::Stream(url.cloned()));
    }

    fn on_track_metadata_changed(&mut self, artist: Option<&str>, title: Option<&str>) {
        self.push(Notification::Metadata(
            artist.map(str::to_string),
            title.map(str::to_string),
        ));
    }

    fn on_artwork_changed(&mut self, url: Option<&Url>) {
        self.push(Notification::Artwork(url.cloned()));
    }
}
