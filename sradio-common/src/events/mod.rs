//! Event system for sradio
//!
//! Provides the shared event definitions and the EventBus used to fan out
//! engine notifications to any number of listeners.

mod state_types;

pub use state_types::{PlaybackState, PlayerState};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use url::Url;

/// sradio event types
///
/// Events are broadcast via EventBus and can be serialized for remote
/// listeners. Every event is emitted from the engine's owner context, so the
/// order observed by a subscriber is the order in which state changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RadioEvent {
    /// Asset-loading/buffering health changed
    PlayerStateChanged {
        old_state: PlayerState,
        new_state: PlayerState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Play/pause/stop intent changed
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A new item was attached (or the stream was cleared)
    StreamChanged {
        url: Option<Url>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Timed metadata resolved into artist/track
    TrackMetadataChanged {
        artist: Option<String>,
        title: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Cover art lookup finished; `None` means no artwork
    ArtworkChanged {
        url: Option<Url>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Network reachability transition
    ConnectivityChanged {
        connected: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Stall recovery reloaded the current item
    StreamReloaded {
        url: Url,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block the engine)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use sradio_common::events::{EventBus, RadioEvent, PlaybackState};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(RadioEvent::PlaybackStateChanged {
///     old_state: PlaybackState::Stopped,
///     new_state: PlaybackState::Playing,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RadioEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<RadioEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: RadioEvent,
    ) -> Result<usize, broadcast::error::SendError<RadioEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: RadioEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
