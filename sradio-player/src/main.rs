//! Internet radio player (sradio-player) - Main entry point
//!
//! Plays a single station or stream URL from the command line, printing the
//! now-playing status until interrupted.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use sradio_common::catalog::{filter_stations, load_stations};
use sradio_common::config::TomlConfig;
use sradio_common::{PlaybackState, PlayerState, RadioEvent};
use sradio_player::source::{HttpSourceSettings, HttpStreamSource};
use sradio_player::{EngineConfig, PlaybackEngine, PlayerDelegate, TcpProbeReachability};
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Command-line arguments for sradio-player
#[derive(Parser, Debug)]
#[command(name = "sradio-player")]
#[command(about = "Internet radio stream player")]
#[command(version)]
struct Args {
    /// Config file (overrides SRADIO_CONFIG and the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Station catalog (JSON)
    #[arg(short, long, env = "SRADIO_STATIONS")]
    stations: Option<PathBuf>,

    /// Play the first station whose name contains this text
    #[arg(long, requires = "stations")]
    station: Option<String>,

    /// Play this stream URL directly
    #[arg(short, long, conflicts_with = "stations")]
    url: Option<Url>,

    /// Load the stream without starting playback
    #[arg(long)]
    no_autoplay: bool,

    /// Output volume (0.0-1.0)
    #[arg(long)]
    volume: Option<f32>,
}

/// Prints a one-line status whenever the engine state changes
struct ConsoleStatus {
    station: Option<String>,
    player_state: PlayerState,
    playback_state: PlaybackState,
}

impl ConsoleStatus {
    fn print(&self) {
        if let Some(line) = status_line(self.station.as_deref(), self.player_state, self.playback_state) {
            println!("{}", line);
        }
    }
}

impl PlayerDelegate for ConsoleStatus {
    fn on_player_state_changed(&mut self, state: PlayerState) {
        self.player_state = state;
        self.print();
    }

    fn on_playback_state_changed(&mut self, state: PlaybackState) {
        self.playback_state = state;
        self.print();
    }

    fn on_track_metadata_changed(&mut self, artist: Option<&str>, title: Option<&str>) {
        match (artist, title) {
            (Some(artist), Some(title)) => println!("♪ {} - {}", artist, title),
            (None, Some(text)) | (Some(text), None) => println!("♪ {}", text),
            (None, None) => {}
        }
    }

    fn on_artwork_changed(&mut self, url: Option<&Url>) {
        if let Some(url) = url {
            println!("  artwork: {}", url);
        }
    }
}

/// Presentation status for a state pair, if it has one
fn status_line(station: Option<&str>, player: PlayerState, playback: PlaybackState) -> Option<String> {
    let name = station.unwrap_or("stream");
    match (player, playback) {
        (PlayerState::UrlNotSet, _) => Some("Station URL not valid".to_string()),
        (PlayerState::Error, _) => Some("Error Playing".to_string()),
        (PlayerState::Loading, PlaybackState::Playing) => Some(format!("Loading Station {} ...", name)),
        (_, PlaybackState::Paused) => Some(format!("{} Paused...", name)),
        (_, PlaybackState::Stopped) => None,
        (_, PlaybackState::Playing) => Some(format!("Playing {}", name)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = TomlConfig::resolve_and_load(args.config.as_deref())
        .context("Failed to load configuration")?;

    // Initialize tracing
    let default_filter = format!(
        "sradio_player={level},sradio_common={level}",
        level = toml.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting sradio-player v{} ({}, {} build, {})",
        env!("CARGO_PKG_VERSION"),
        env!("SRADIO_GIT_REVISION"),
        env!("SRADIO_BUILD_PROFILE"),
        env!("SRADIO_BUILT_AT")
    );

    let mut config = EngineConfig::from_toml(&toml).context("Invalid engine configuration")?;
    if args.no_autoplay {
        config.auto_play = false;
    }
    if let Some(volume) = args.volume {
        if !(0.0..=1.0).contains(&volume) {
            bail!("--volume must be within 0.0-1.0, got {}", volume);
        }
        config.initial_volume = volume;
    }

    let station = match &args.stations {
        Some(path) => {
            let stations = load_stations(path)
                .with_context(|| format!("Failed to load stations from {}", path.display()))?;
            info!("Loaded {} stations from {}", stations.len(), path.display());
            let query = args.station.as_deref().unwrap_or_default();
            let Some(station) = filter_stations(&stations, query).into_iter().next().cloned() else {
                bail!("No station matches {:?}", query);
            };
            Some(station)
        }
        None => None,
    };
    if station.is_none() && args.url.is_none() {
        bail!("Nothing to play: pass --url or --stations");
    }

    let source = HttpStreamSource::new(HttpSourceSettings::default())
        .context("Failed to create HTTP stream source")?;
    let reachability = TcpProbeReachability::new(
        toml.reachability.probe_addr.clone(),
        Duration::from_millis(toml.reachability.interval_ms),
        Duration::from_millis(toml.reachability.timeout_ms),
    );
    let status = ConsoleStatus {
        station: station.as_ref().map(|s| s.name.clone()),
        player_state: PlayerState::UrlNotSet,
        playback_state: PlaybackState::Stopped,
    };

    let engine = PlaybackEngine::builder(source)
        .config(config)
        .reachability(reachability)
        .delegate(status)
        .start()
        .context("Failed to start playback engine")?;

    spawn_event_logger(&engine);

    match station {
        Some(station) => engine.set_station(Some(station))?,
        None => engine.set_stream(args.url.clone())?,
    }

    shutdown_signal().await;

    engine
        .shutdown()
        .await
        .context("Playback engine did not shut down cleanly")?;
    info!("Shutdown complete");
    Ok(())
}

/// Log engine events from the broadcast bus
fn spawn_event_logger(engine: &PlaybackEngine) {
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(RadioEvent::ConnectivityChanged { connected, .. }) => {
                    info!("Network {}", if connected { "reachable" } else { "unreachable" });
                }
                Ok(RadioEvent::StreamReloaded { url, .. }) => info!("Reloaded {}", url),
                Ok(event) => debug!("Event: {:?}", event),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Event logger lagged by {} events", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
