//! Public engine handle and construction

use super::actor::EngineActor;
use super::messages::{Command, Mailbox, Message};
use crate::config::EngineConfig;
use crate::delegate::PlayerDelegate;
use crate::error::{Error, Result};
use crate::metadata::ArtworkResolver;
use crate::reachability::ReachabilityMonitor;
use crate::source::StreamSource;
use sradio_common::{EventBus, PlaybackState, PlayerState, RadioEvent, Station, Track};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};
use url::Url;

/// Audio-session interruption notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// Another session took the output; playback pauses
    Began,
    /// The interruption is over; playback resumes only when `should_resume`
    Ended { should_resume: bool },
}

/// Point-in-time copy of engine state
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub player_state: PlayerState,
    pub playback_state: PlaybackState,
    pub stream: Option<Url>,
    pub station: Option<Station>,
    pub track: Option<Track>,
    pub volume: f32,
    pub auto_play: bool,
    pub connected: bool,
    /// A stall recheck is pending
    pub recovering: bool,
    /// An item is attached to the media primitive
    pub item_attached: bool,
}

impl EngineSnapshot {
    pub fn is_playing(&self) -> bool {
        self.playback_state.is_playing()
    }
}

/// Cloneable handle to a running playback engine
///
/// Every method posts to the engine's mailbox and returns immediately;
/// `snapshot` and `shutdown` wait for the engine to answer. Once every
/// handle is dropped the engine tears down its item and exits.
#[derive(Clone)]
pub struct PlaybackEngine {
    tx: mpsc::UnboundedSender<Message>,
    events: EventBus,
}

impl PlaybackEngine {
    pub fn builder(source: impl StreamSource) -> PlaybackEngineBuilder {
        PlaybackEngineBuilder::new(Box::new(source))
    }

    /// Replace the stream; `None` tears playback down
    pub fn set_stream(&self, url: Option<Url>) -> Result<()> {
        self.command(Command::SetStream(url))
    }

    /// Select a station; its stream URL becomes the stream
    pub fn set_station(&self, station: Option<Station>) -> Result<()> {
        self.command(Command::SetStation(station))
    }

    pub fn play(&self) -> Result<()> {
        self.command(Command::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.command(Command::Pause)
    }

    pub fn stop(&self) -> Result<()> {
        self.command(Command::Stop)
    }

    pub fn toggle_playing(&self) -> Result<()> {
        self.command(Command::TogglePlaying)
    }

    /// Set output volume; values outside 0.0-1.0 are ignored
    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.command(Command::SetVolume(volume))
    }

    pub fn set_auto_play(&self, auto_play: bool) -> Result<()> {
        self.command(Command::SetAutoPlay(auto_play))
    }

    /// Forward an audio-session interruption
    pub fn interrupt(&self, interruption: Interruption) -> Result<()> {
        self.command(Command::Interrupt(interruption))
    }

    /// Current engine state, after all previously posted commands
    pub async fn snapshot(&self) -> Result<EngineSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.post(Message::Snapshot(reply))?;
        rx.await.map_err(|_| Error::EngineClosed)
    }

    /// Tear down the current item and stop the engine task
    pub async fn shutdown(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.post(Message::Shutdown(reply))?;
        rx.await.map_err(|_| Error::EngineClosed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RadioEvent> {
        self.events.subscribe()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    fn command(&self, command: Command) -> Result<()> {
        debug!("Engine command: {:?}", command);
        self.post(Message::Command(command))
    }

    fn post(&self, message: Message) -> Result<()> {
        self.tx.send(message).map_err(|_| Error::EngineClosed)
    }
}

/// Assembles the engine's collaborators
pub struct PlaybackEngineBuilder {
    config: EngineConfig,
    source: Box<dyn StreamSource>,
    reachability: Option<Box<dyn ReachabilityMonitor>>,
    delegate: Option<Box<dyn PlayerDelegate>>,
    artwork: Option<ArtworkResolver>,
    events: Option<EventBus>,
}

impl PlaybackEngineBuilder {
    fn new(source: Box<dyn StreamSource>) -> Self {
        Self {
            config: EngineConfig::default(),
            source,
            reachability: None,
            delegate: None,
            artwork: None,
            events: None,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn reachability(mut self, monitor: impl ReachabilityMonitor) -> Self {
        self.reachability = Some(Box::new(monitor));
        self
    }

    pub fn delegate(mut self, delegate: impl PlayerDelegate) -> Self {
        self.delegate = Some(Box::new(delegate));
        self
    }

    /// Use this resolver instead of one built from the config
    pub fn artwork_resolver(mut self, resolver: ArtworkResolver) -> Self {
        self.artwork = Some(resolver);
        self
    }

    /// Publish on an existing bus instead of a new one
    pub fn event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Spawn the engine task; must be called inside a tokio runtime
    pub fn start(self) -> Result<PlaybackEngine> {
        let Self {
            config,
            source,
            reachability,
            delegate,
            artwork,
            events,
        } = self;

        let artwork = if config.enable_artwork {
            match artwork {
                Some(resolver) => Some(resolver),
                None => Some(ArtworkResolver::new(config.search_url()?, config.artwork_size)),
            }
        } else {
            None
        };

        let events = events.unwrap_or_else(|| EventBus::new(config.event_capacity));
        let (tx, rx) = mpsc::unbounded_channel();
        let mailbox = Mailbox::new(&tx);

        let (connected, monitored) = match reachability {
            Some(monitor) => match monitor.start() {
                Ok(watch) => {
                    let connected = *watch.borrow();
                    spawn_reachability_forwarder(watch, mailbox.clone());
                    (connected, true)
                }
                Err(e) => {
                    warn!("Reachability monitor failed to start, assuming connected: {}", e);
                    (true, false)
                }
            },
            None => {
                debug!("No reachability monitor, assuming connected");
                (true, false)
            }
        };

        let actor = EngineActor::new(
            config,
            source,
            delegate,
            artwork,
            events.clone(),
            mailbox,
            connected,
            monitored,
        );
        tokio::spawn(actor.run(rx));
        info!("Playback engine created");

        Ok(PlaybackEngine { tx, events })
    }
}

fn spawn_reachability_forwarder(mut watch: tokio::sync::watch::Receiver<bool>, mailbox: Mailbox) {
    tokio::spawn(async move {
        while watch.changed().await.is_ok() {
            let connected = *watch.borrow_and_update();
            if !mailbox.post(Message::Reachability(connected)) {
                break;
            }
        }
        debug!("Reachability forwarder stopped");
    });
}
