//! Bootstrap configuration loading and config-file resolution
//!
//! Resolution priority for the config file:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. User config directory (`<config_dir>/sradio/config.toml`)
//! 4. Built-in defaults (no file)
//!
//! A missing file is not fatal: a warning is logged and defaults are used.
//! A file that exists but does not parse is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SRADIO_CONFIG";

/// Default iTunes-style song search endpoint
pub const DEFAULT_ARTWORK_SEARCH_URL: &str = "https://itunes.apple.com/search";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub player: PlayerSection,
    pub artwork: ArtworkSection,
    pub reachability: ReachabilitySection,
    pub logging: LoggingConfig,
}

/// `[player]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSection {
    /// Start playback as soon as an item is attached
    pub auto_play: bool,
    /// Look up cover art for timed metadata
    pub enable_artwork: bool,
    /// Requested cover size in pixels (square)
    pub artwork_size: u32,
    /// Delay before re-checking a stalled item
    pub stall_recheck_delay_ms: u64,
    /// Output volume applied to the media primitive (0.0-1.0)
    pub initial_volume: f32,
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            auto_play: true,
            enable_artwork: true,
            artwork_size: 100,
            stall_recheck_delay_ms: 1000,
            initial_volume: 1.0,
        }
    }
}

/// `[artwork]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtworkSection {
    pub search_url: String,
}

impl Default for ArtworkSection {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_ARTWORK_SEARCH_URL.to_string(),
        }
    }
}

/// `[reachability]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachabilitySection {
    /// `host:port` probed with a TCP connect
    pub probe_addr: String,
    pub interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for ReachabilitySection {
    fn default() -> Self {
        Self {
            probe_addr: "1.1.1.1:53".to_string(),
            interval_ms: 5000,
            timeout_ms: 2000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    ///
    /// Missing file → defaults (with a warning). Unreadable or malformed
    /// file → error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve the config file location and load it
    pub fn resolve_and_load(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg, CONFIG_ENV_VAR) {
            Some(path) => Self::load(&path),
            None => {
                info!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let volume = self.player.initial_volume;
        if !(0.0..=1.0).contains(&volume) {
            return Err(Error::Config(format!(
                "player.initial_volume must be within 0.0-1.0, got {}",
                volume
            )));
        }
        if self.player.artwork_size == 0 {
            return Err(Error::Config(
                "player.artwork_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolve which config file to read, following the priority order above
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: User config directory, only if the file exists
    dirs::config_dir()
        .map(|d| d.join("sradio").join("config.toml"))
        .filter(|p| p.exists())
}
