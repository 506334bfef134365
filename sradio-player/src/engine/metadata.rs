//! Timed metadata and artwork application

use super::actor::EngineActor;
use super::messages::Message;
use crate::metadata::parse_stream_title;
use sradio_common::Track;
use tracing::{debug, info};
use url::Url;

impl EngineActor {
    /// Apply in-stream metadata from the attached item
    pub(super) fn apply_timed_metadata(&mut self, raw: Option<String>) {
        let raw = raw
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        // Any in-flight lookup belongs to the previous title
        self.metadata_generation += 1;
        self.last_metadata = raw.clone();

        let Some(parsed) = parse_stream_title(raw.as_deref()) else {
            debug!("Empty stream metadata, restoring station defaults");
            self.reset_track_to_station();
            return;
        };

        info!(
            "Now playing: {} - {}",
            parsed.artist.as_deref().unwrap_or("?"),
            parsed.title.as_deref().unwrap_or("?")
        );

        let track = self
            .track
            .get_or_insert_with(|| Track::new(String::new(), String::new()));
        track.artist = parsed.artist.clone().unwrap_or_default();
        track.title = parsed.title.clone().unwrap_or_default();
        self.notify_track_metadata(parsed.artist.as_deref(), parsed.title.as_deref());

        if let (Some(resolver), Some(term)) = (self.artwork.clone(), raw) {
            let generation = self.metadata_generation;
            let mailbox = self.mailbox.clone();
            tokio::spawn(async move {
                let url = resolver.lookup(&term).await;
                mailbox.post(Message::ArtworkResolved {
                    generation,
                    term,
                    url,
                });
            });
        }
    }

    /// Track placeholder from the current station, or blank without one
    pub(super) fn reset_track_to_station(&mut self) {
        if self.stream.is_none() {
            return;
        }

        let track = match &self.station {
            Some(station) => Track::for_station(station),
            None => Track::new(String::new(), String::new()),
        };
        let artist = Some(track.artist.clone()).filter(|a| !a.is_empty());
        let title = Some(track.title.clone()).filter(|t| !t.is_empty());
        let artwork = track.artwork_url.clone();

        self.track = Some(track);
        self.notify_track_metadata(artist.as_deref(), title.as_deref());
        self.notify_artwork(artwork.as_ref());
    }

    /// Apply a finished lookup if it still matches the current title
    pub(super) fn apply_artwork(&mut self, generation: u64, term: &str, url: Option<Url>) {
        if generation != self.metadata_generation || self.last_metadata.as_deref() != Some(term) {
            info!("Discarding stale artwork for {:?}", term);
            return;
        }

        let placeholder = self
            .station
            .as_ref()
            .and_then(|station| station.remote_image_url());
        let Some(track) = self.track.as_mut() else {
            return;
        };

        match &url {
            Some(url) => {
                debug!("Artwork for {:?}: {}", term, url);
                track.artwork_url = Some(url.clone());
                track.artwork_loaded = true;
            }
            None => {
                debug!("No artwork for {:?}", term);
                track.artwork_url = placeholder;
                track.artwork_loaded = false;
            }
        }
        self.notify_artwork(url.as_ref());
    }
}
