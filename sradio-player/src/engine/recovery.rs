//! Stall recovery, audio interruptions and reachability policy
//!
//! A stall is an attached item that reports an empty buffer (or is found
//! not keeping up when connectivity returns). Recovery pauses the item,
//! waits `stall_recheck_delay`, then reloads the item once if it still
//! cannot keep up and restores whatever the playback intent is at that
//! point. Only one recovery is in flight at a time.

use super::actor::EngineActor;
use super::core::Interruption;
use super::messages::Message;
use chrono::Utc;
use sradio_common::RadioEvent;
use tracing::{debug, info};

impl EngineActor {
    pub(super) fn check_stall(&mut self) {
        if self.recovering {
            debug!("Stall recovery already pending");
            return;
        }
        if self.attached.is_none() || self.source.is_likely_to_keep_up() {
            return;
        }
        if self.reachability_active && !self.connected {
            debug!("Stalled while offline, waiting for connectivity");
            return;
        }

        self.recovering = true;
        self.source.pause();

        let generation = self.stream_generation;
        let delay = self.config.stall_recheck_delay();
        let mailbox = self.mailbox.clone();
        info!("Stream stalled, re-checking in {:?}", delay);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            mailbox.post(Message::StallRecheck { generation });
        });
    }

    pub(super) fn recheck_stall(&mut self, generation: u64) {
        if generation != self.stream_generation {
            info!("Discarding stall recheck for replaced stream");
            return;
        }
        self.recovering = false;

        if self.attached.is_none() {
            debug!("Item detached during stall delay, nothing to recover");
            return;
        }

        if !self.source.is_likely_to_keep_up() {
            self.reload_item();
        }

        // Intent may have changed during the delay
        if self.playback_state.is_playing() {
            self.source.play();
        } else {
            self.source.pause();
        }
    }

    /// Replace the live item with a fresh one for the same asset
    fn reload_item(&mut self) {
        let Some(url) = self.stream.clone() else {
            return;
        };
        info!("Reloading stalled stream {}", url);
        self.attach_item();
        self.emit(RadioEvent::StreamReloaded {
            url,
            timestamp: Utc::now(),
        });
    }

    pub(super) fn handle_reachability(&mut self, connected: bool) {
        let was_connected = self.connected;
        self.connected = connected;
        if was_connected == connected {
            return;
        }

        info!("Connectivity changed: connected={}", connected);
        self.emit(RadioEvent::ConnectivityChanged {
            connected,
            timestamp: Utc::now(),
        });

        if connected {
            self.check_stall();
        }
    }

    pub(super) fn handle_interruption(&mut self, interruption: Interruption) {
        info!("Audio interruption: {:?}", interruption);
        match interruption {
            Interruption::Began => self.pause(),
            Interruption::Ended { should_resume: true } => self.play(),
            Interruption::Ended { should_resume: false } => {
                debug!("Interruption ended without resume hint, staying {:?}", self.playback_state);
            }
        }
    }
}
