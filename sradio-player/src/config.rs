//! Runtime configuration for the playback engine
//!
//! Built from the bootstrap `TomlConfig` (see `sradio_common::config`) and
//! then fixed for the lifetime of the engine, apart from `auto_play` and
//! volume which have engine setters.

use crate::error::{Error, Result};
use sradio_common::config::TomlConfig;
use std::time::Duration;
use url::Url;

/// Engine settings with built-in defaults
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Play as soon as an item is attached
    pub auto_play: bool,
    /// Resolve cover art for timed metadata
    pub enable_artwork: bool,
    /// Requested cover size (square, pixels)
    pub artwork_size: u32,
    /// Delay between pausing a stalled item and re-checking it
    pub stall_recheck_delay_ms: u64,
    /// Initial output volume (0.0-1.0)
    pub initial_volume: f32,
    /// Song-search endpoint for artwork
    pub artwork_search_url: String,
    /// Capacity of the RadioEvent broadcast channel
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_sections(&TomlConfig::default())
    }
}

impl EngineConfig {
    /// Derive engine settings from the bootstrap file
    pub fn from_toml(toml: &TomlConfig) -> Result<Self> {
        let config = Self::from_sections(toml);
        config.search_url()?;
        Ok(config)
    }

    fn from_sections(toml: &TomlConfig) -> Self {
        Self {
            auto_play: toml.player.auto_play,
            enable_artwork: toml.player.enable_artwork,
            artwork_size: toml.player.artwork_size,
            stall_recheck_delay_ms: toml.player.stall_recheck_delay_ms,
            initial_volume: toml.player.initial_volume,
            artwork_search_url: toml.artwork.search_url.clone(),
            event_capacity: 256,
        }
    }

    /// Parsed artwork search endpoint
    pub fn search_url(&self) -> Result<Url> {
        Url::parse(&self.artwork_search_url).map_err(|e| {
            Error::Config(format!(
                "artwork search URL {:?} is not valid: {}",
                self.artwork_search_url, e
            ))
        })
    }

    /// Stall recheck delay as Duration
    pub fn stall_recheck_delay(&self) -> Duration {
        Duration::from_millis(self.stall_recheck_delay_ms)
    }
}
