//! # sradio Player Library (sradio-player)
//!
//! Streaming playback engine for internet radio.
//!
//! **Purpose:** Validate and attach a live audio stream, keep playback
//! state consistent across user commands, buffering stalls, audio-session
//! interruptions and connectivity changes, and turn in-stream metadata into
//! now-playing information with cover art.
//!
//! **Architecture:** A single-owner engine task (`engine`) driving a
//! `StreamSource` media primitive, with observers notified through a
//! `PlayerDelegate` and the shared `RadioEvent` bus.

pub mod config;
pub mod delegate;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod reachability;
pub mod source;

pub use config::EngineConfig;
pub use delegate::PlayerDelegate;
pub use engine::{EngineSnapshot, Interruption, PlaybackEngine, PlaybackEngineBuilder};
pub use error::{Error, Result};
pub use reachability::{ManualReachability, ReachabilityMonitor, TcpProbeReachability};
pub use source::{ItemEvent, ItemEventSink, PlayableAsset, StreamSource};
