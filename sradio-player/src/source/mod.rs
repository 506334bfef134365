//! Stream source adapter
//!
//! A `StreamSource` wraps the platform media-playback primitive. The engine
//! is its only caller and drives it from the owner context:
//! - `load` validates playability without blocking; the engine posts the
//!   result back into its mailbox before touching state
//! - `attach`/`detach`/`play`/`pause` are synchronous side-effect calls
//! - item events flow through the `ItemEventSink` handed to `attach`; the
//!   sink must be dropped by `detach` (unsubscribe)

pub mod http;
pub mod icy;

pub use http::{HttpSourceSettings, HttpStreamSource};

use crate::error::Result;
use futures::future::BoxFuture;
use std::sync::Arc;
use url::Url;

/// A stream whose playability has been confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableAsset {
    pub url: Url,
    pub content_type: Option<String>,
    /// ICY metadata interval, if the server offered one
    pub metaint: Option<usize>,
    pub bitrate_kbps: Option<u32>,
    pub station_name: Option<String>,
}

impl PlayableAsset {
    /// Asset with no transport details
    pub fn new(url: Url) -> Self {
        Self {
            url,
            content_type: None,
            metaint: None,
            bitrate_kbps: None,
            station_name: None,
        }
    }
}

/// Item-level events surfaced by the media primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemEvent {
    /// Item is ready to play
    Ready,
    /// Item failed; the message is for logs only
    Failed(String),
    /// Playback buffer ran dry
    BufferEmpty,
    /// Buffer health changed: `true` when playback is likely to keep up
    BufferOk(bool),
    /// In-stream metadata text (e.g. ICY `StreamTitle`)
    TimedMetadata(Option<String>),
}

/// Subscription handle for one attached item
///
/// Emitting returns `false` once the engine is gone. Events from an item the
/// engine has since detached are discarded by the engine.
#[derive(Clone)]
pub struct ItemEventSink {
    deliver: Arc<dyn Fn(ItemEvent) -> bool + Send + Sync>,
}

impl ItemEventSink {
    pub fn new(deliver: impl Fn(ItemEvent) -> bool + Send + Sync + 'static) -> Self {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    pub fn emit(&self, event: ItemEvent) -> bool {
        (self.deliver)(event)
    }
}

impl std::fmt::Debug for ItemEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemEventSink").finish_non_exhaustive()
    }
}

/// Platform media-playback primitive
pub trait StreamSource: Send + 'static {
    /// Validate that `url` is playable
    fn load(&self, url: &Url) -> BoxFuture<'static, Result<PlayableAsset>>;

    /// Make `asset` the current item and subscribe `events` to it
    fn attach(&mut self, asset: &PlayableAsset, events: ItemEventSink);

    /// Drop the current item and its event subscription
    fn detach(&mut self);

    fn play(&mut self);

    fn pause(&mut self);

    /// Whether the current item's buffer is expected to keep up
    fn is_likely_to_keep_up(&self) -> bool;

    /// Output volume, already range-checked by the engine
    fn set_volume(&mut self, volume: f32);
}
