//! Observer callbacks for the playback engine
//!
//! The engine holds at most one delegate and invokes it from its owner
//! context, so callbacks for one facet arrive strictly in order and only when
//! the value actually changed. Callbacks must not block.

use sradio_common::{PlaybackState, PlayerState};
use url::Url;

pub trait PlayerDelegate: Send + 'static {
    fn on_player_state_changed(&mut self, state: PlayerState);

    fn on_playback_state_changed(&mut self, state: PlaybackState);

    fn on_stream_changed(&mut self, _url: Option<&Url>) {}

    fn on_track_metadata_changed(&mut self, _artist: Option<&str>, _title: Option<&str>) {}

    fn on_artwork_changed(&mut self, _url: Option<&Url>) {}
}
