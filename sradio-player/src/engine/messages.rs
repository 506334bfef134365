//! Mailbox message types for the engine's owner context

use super::{EngineSnapshot, Interruption};
use crate::error::Result;
use crate::source::{ItemEvent, PlayableAsset};
use sradio_common::Station;
use tokio::sync::{mpsc, oneshot};
use url::Url;

/// Commands issued through the public handle
#[derive(Debug)]
pub(crate) enum Command {
    SetStream(Option<Url>),
    SetStation(Option<Station>),
    Play,
    Pause,
    Stop,
    TogglePlaying,
    SetVolume(f32),
    SetAutoPlay(bool),
    Interrupt(Interruption),
}

/// Everything that may touch engine state arrives as one of these
#[derive(Debug)]
pub(crate) enum Message {
    Command(Command),
    /// Asset validation finished for the stream of `generation`
    AssetLoaded {
        generation: u64,
        result: Result<PlayableAsset>,
    },
    /// Event from the attached item `item_id`
    Item { item_id: u64, event: ItemEvent },
    Reachability(bool),
    /// Stall recovery delay elapsed for the stream of `generation`
    StallRecheck { generation: u64 },
    /// Artwork lookup finished for metadata `generation`
    ArtworkResolved {
        generation: u64,
        term: String,
        url: Option<Url>,
    },
    Snapshot(oneshot::Sender<EngineSnapshot>),
    Shutdown(oneshot::Sender<()>),
}

/// Weak posting handle used by background producers
///
/// Holding it does not keep the engine alive; posting after the engine has
/// stopped is a silent no-op.
#[derive(Clone)]
pub(crate) struct Mailbox {
    tx: mpsc::WeakUnboundedSender<Message>,
}

impl Mailbox {
    pub(crate) fn new(tx: &mpsc::UnboundedSender<Message>) -> Self {
        Self { tx: tx.downgrade() }
    }

    pub(crate) fn post(&self, message: Message) -> bool {
        match self.tx.upgrade() {
            Some(tx) => tx.send(message).is_ok(),
            None => false,
        }
    }
}
