//! Engine owner context: state machine and item lifecycle
//!
//! The actor is the only code that reads or writes engine state. Public
//! mutators, item events, timers and lookups all reach it as `Message`s.

use super::core::EngineSnapshot;
use super::messages::{Command, Mailbox, Message};
use crate::config::EngineConfig;
use crate::delegate::PlayerDelegate;
use crate::error::Result;
use crate::metadata::ArtworkResolver;
use crate::source::{ItemEvent, ItemEventSink, PlayableAsset, StreamSource};
use chrono::Utc;
use sradio_common::{EventBus, PlaybackState, PlayerState, RadioEvent, Station, Track};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use url::Url;

pub(super) struct EngineActor {
    pub(super) config: EngineConfig,
    pub(super) source: Box<dyn StreamSource>,
    delegate: Option<Box<dyn PlayerDelegate>>,
    events: EventBus,
    pub(super) artwork: Option<ArtworkResolver>,
    pub(super) mailbox: Mailbox,

    player_state: PlayerState,
    pub(super) playback_state: PlaybackState,
    pub(super) stream: Option<Url>,
    pub(super) station: Option<Station>,
    pub(super) track: Option<Track>,
    volume: f32,

    /// Bumped whenever the current item is torn down
    pub(super) stream_generation: u64,
    /// Validated asset for the current stream
    asset: Option<PlayableAsset>,
    /// Id of the item attached to the primitive, if any
    pub(super) attached: Option<u64>,
    next_item_id: u64,

    /// Raw text of the last timed metadata, used as the artwork search term
    pub(super) last_metadata: Option<String>,
    /// Bumped on every metadata change; artwork results must match it
    pub(super) metadata_generation: u64,

    pub(super) connected: bool,
    /// Whether `connected` comes from a running monitor
    pub(super) reachability_active: bool,
    pub(super) recovering: bool,
}

impl EngineActor {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        config: EngineConfig,
        source: Box<dyn StreamSource>,
        delegate: Option<Box<dyn PlayerDelegate>>,
        artwork: Option<ArtworkResolver>,
        events: EventBus,
        mailbox: Mailbox,
        connected: bool,
        reachability_active: bool,
    ) -> Self {
        let volume = if (0.0..=1.0).contains(&config.initial_volume) {
            config.initial_volume
        } else {
            1.0
        };

        Self {
            config,
            source,
            delegate,
            events,
            artwork,
            mailbox,
            player_state: PlayerState::UrlNotSet,
            playback_state: PlaybackState::Stopped,
            stream: None,
            station: None,
            track: None,
            volume,
            stream_generation: 0,
            asset: None,
            attached: None,
            next_item_id: 0,
            last_metadata: None,
            metadata_generation: 0,
            connected,
            reachability_active,
            recovering: false,
        }
    }

    pub(super) async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Message>) {
        info!("Playback engine started");

        while let Some(message) = rx.recv().await {
            match message {
                Message::Command(command) => self.handle_command(command),
                Message::AssetLoaded { generation, result } => {
                    self.handle_asset_loaded(generation, result)
                }
                Message::Item { item_id, event } => self.handle_item_event(item_id, event),
                Message::Reachability(connected) => self.handle_reachability(connected),
                Message::StallRecheck { generation } => self.recheck_stall(generation),
                Message::ArtworkResolved {
                    generation,
                    term,
                    url,
                } => self.apply_artwork(generation, &term, url),
                Message::Snapshot(reply) => {
                    let _ = reply.send(self.snapshot());
                }
                Message::Shutdown(reply) => {
                    self.reset_item();
                    let _ = reply.send(());
                    info!("Playback engine shut down");
                    return;
                }
            }
        }

        self.reset_item();
        info!("Playback engine stopped: all handles dropped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SetStream(url) => {
                self.station = None;
                self.set_stream(url);
            }
            Command::SetStation(station) => self.set_station(station),
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::Stop => self.stop(),
            Command::TogglePlaying => {
                if self.playback_state.is_playing() {
                    self.pause();
                } else {
                    self.play();
                }
            }
            Command::SetVolume(volume) => self.set_volume(volume),
            Command::SetAutoPlay(auto_play) => {
                debug!("Auto-play: {}", auto_play);
                self.config.auto_play = auto_play;
            }
            Command::Interrupt(interruption) => self.handle_interruption(interruption),
        }
    }

    fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            player_state: self.player_state,
            playback_state: self.playback_state,
            stream: self.stream.clone(),
            station: self.station.clone(),
            track: self.track.clone(),
            volume: self.volume,
            auto_play: self.config.auto_play,
            connected: self.connected,
            recovering: self.recovering,
            item_attached: self.attached.is_some(),
        }
    }

    // ----- stream and station -----

    fn set_station(&mut self, station: Option<Station>) {
        let Some(station) = station else {
            self.station = None;
            self.set_stream(None);
            return;
        };

        info!("Loading station {:?}", station.name);
        let url = match station.parse_stream_url() {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Station {:?} has an invalid stream URL {:?}: {}", station.name, station.stream_url, e);
                None
            }
        };

        let has_stream = url.is_some();
        self.station = Some(station);
        self.set_stream(url);
        if has_stream {
            self.reset_track_to_station();
        }
    }

    /// Tear down the current item and start loading `url`
    pub(super) fn set_stream(&mut self, url: Option<Url>) {
        self.reset_item();
        self.track = None;
        self.stream = url.clone();

        let Some(url) = url else {
            self.set_player_state(PlayerState::UrlNotSet);
            return;
        };

        self.set_player_state(PlayerState::Loading);
        let generation = self.stream_generation;
        let load = self.source.load(&url);
        let mailbox = self.mailbox.clone();
        debug!("Validating stream {} (generation {})", url, generation);
        tokio::spawn(async move {
            let result = load.await;
            mailbox.post(Message::AssetLoaded { generation, result });
        });
    }

    fn handle_asset_loaded(&mut self, generation: u64, result: Result<PlayableAsset>) {
        if generation != self.stream_generation {
            info!(
                "Discarding asset validation for generation {} (current {})",
                generation, self.stream_generation
            );
            return;
        }

        match result {
            Ok(asset) => {
                info!("Stream {} is playable", asset.url);
                self.asset = Some(asset);
                self.attach_item();
                let stream = self.stream.clone();
                self.notify_stream_changed(stream.as_ref());
                if self.config.auto_play {
                    self.play();
                }
            }
            Err(e) => {
                warn!("Stream validation failed: {}", e);
                self.reset_item();
                self.set_player_state(PlayerState::Error);
            }
        }
    }

    // ----- item lifecycle -----

    /// Attach the current asset as a fresh item, replacing any live one
    pub(super) fn attach_item(&mut self) {
        let Some(asset) = self.asset.clone() else {
            return;
        };
        self.detach_item();

        self.next_item_id += 1;
        let item_id = self.next_item_id;
        let mailbox = self.mailbox.clone();
        let sink = ItemEventSink::new(move |event| mailbox.post(Message::Item { item_id, event }));

        self.source.set_volume(self.volume);
        self.source.attach(&asset, sink);
        self.attached = Some(item_id);
        debug!("Attached item {} for {}", item_id, asset.url);
    }

    /// Pause and unsubscribe the live item, if any
    pub(super) fn detach_item(&mut self) {
        if let Some(item_id) = self.attached.take() {
            self.source.pause();
            self.source.detach();
            debug!("Detached item {}", item_id);
        }
    }

    /// Stop playback and drop the validated asset
    ///
    /// Invalidates pending loads, stall rechecks and artwork lookups.
    fn reset_item(&mut self) {
        self.stop();
        self.stream_generation += 1;
        self.recovering = false;
        if self.asset.take().is_some() {
            self.notify_stream_changed(None);
        }
    }

    fn handle_item_event(&mut self, item_id: u64, event: ItemEvent) {
        if self.attached != Some(item_id) {
            trace!("Ignoring {:?} from detached item {}", event, item_id);
            return;
        }

        match event {
            ItemEvent::Ready => self.set_player_state(PlayerState::ReadyToPlay),
            ItemEvent::Failed(reason) => {
                warn!("Item {} failed: {}", item_id, reason);
                self.set_player_state(PlayerState::Error);
            }
            ItemEvent::BufferEmpty => {
                self.set_player_state(PlayerState::Loading);
                self.check_stall();
            }
            ItemEvent::BufferOk(true) => self.set_player_state(PlayerState::LoadingFinished),
            ItemEvent::BufferOk(false) => self.set_player_state(PlayerState::Loading),
            ItemEvent::TimedMetadata(raw) => self.apply_timed_metadata(raw),
        }
    }

    // ----- transport -----

    pub(super) fn play(&mut self) {
        if self.asset.is_none() {
            debug!("Play ignored: no playable item");
            return;
        }
        if self.attached.is_none() {
            self.attach_item();
        }
        self.source.play();
        self.set_playback_state(PlaybackState::Playing);
    }

    pub(super) fn pause(&mut self) {
        if self.asset.is_none() {
            debug!("Pause ignored: no playable item");
            return;
        }
        self.source.pause();
        self.set_playback_state(PlaybackState::Paused);
    }

    /// Detach the item but keep stream and track identity
    fn stop(&mut self) {
        self.detach_item();
        self.metadata_generation += 1;
        self.last_metadata = None;
        self.set_playback_state(PlaybackState::Stopped);
    }

    fn set_volume(&mut self, volume: f32) {
        if !(0.0..=1.0).contains(&volume) {
            debug!("Ignoring out-of-range volume {}", volume);
            return;
        }
        self.volume = volume;
        self.source.set_volume(volume);
    }

    // ----- notifications -----

    pub(super) fn set_player_state(&mut self, new_state: PlayerState) {
        let old_state = self.player_state;
        if old_state == new_state {
            return;
        }
        self.player_state = new_state;
        debug!("Player state: {} -> {}", old_state, new_state);

        if let Some(delegate) = self.delegate.as_mut() {
            delegate.on_player_state_changed(new_state);
        }
        self.events.emit_lossy(RadioEvent::PlayerStateChanged {
            old_state,
            new_state,
            timestamp: Utc::now(),
        });
    }

    pub(super) fn set_playback_state(&mut self, new_state: PlaybackState) {
        let old_state = self.playback_state;
        if old_state == new_state {
            return;
        }
        self.playback_state = new_state;
        info!("Playback state: {:?} -> {:?}", old_state, new_state);

        if let Some(delegate) = self.delegate.as_mut() {
            delegate.on_playback_state_changed(new_state);
        }
        self.events.emit_lossy(RadioEvent::PlaybackStateChanged {
            old_state,
            new_state,
            timestamp: Utc::now(),
        });
    }

    fn notify_stream_changed(&mut self, url: Option<&Url>) {
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.on_stream_changed(url);
        }
        self.events.emit_lossy(RadioEvent::StreamChanged {
            url: url.cloned(),
            timestamp: Utc::now(),
        });
    }

    pub(super) fn notify_track_metadata(&mut self, artist: Option<&str>, title: Option<&str>) {
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.on_track_metadata_changed(artist, title);
        }
        self.events.emit_lossy(RadioEvent::TrackMetadataChanged {
            artist: artist.map(str::to_string),
            title: title.map(str::to_string),
            timestamp: Utc::now(),
        });
    }

    pub(super) fn notify_artwork(&mut self, url: Option<&Url>) {
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.on_artwork_changed(url);
        }
        self.events.emit_lossy(RadioEvent::ArtworkChanged {
            url: url.cloned(),
            timestamp: Utc::now(),
        });
    }

    pub(super) fn emit(&self, event: RadioEvent) {
        self.events.emit_lossy(event);
    }
}
