//! Test helper modules for sradio-player integration tests
//!
//! Provides reusable test infrastructure components:
//! - FakeSource: scripted StreamSource that records every primitive call
//! - RecordingDelegate: PlayerDelegate that records every notification

#![allow(dead_code)]

pub mod fake_source;
pub mod recording_delegate;

pub use fake_source::{Call, FakeSource};
pub use recording_delegate::{Notification, RecordingDelegate};

use sradio_player::{EngineConfig, EngineSnapshot, PlaybackEngine};
use url::Url;

/// Engine config with artwork lookups off
pub fn test_config() -> EngineConfig {
    EngineConfig {
        enable_artwork: false,
        ..EngineConfig::default()
    }
}

pub fn stream_url(name: &str) -> Url {
    Url::parse(&format!("http://radio.example.com/{}", name)).unwrap()
}

/// Let spawned tasks run, then read engine state
pub async fn settle(engine: &PlaybackEngine) -> EngineSnapshot {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    engine.snapshot().await.unwrap()
}
