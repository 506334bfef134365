//! Network reachability monitoring
//!
//! A monitor publishes connectivity through a `watch` channel. The engine
//! starts it once at construction; if `start` fails the engine assumes it is
//! always connected.

use crate::error::{Error, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, info};

/// Source of connectivity transitions
pub trait ReachabilityMonitor: Send + Sync + 'static {
    /// Start the background notifier
    fn start(&self) -> Result<watch::Receiver<bool>>;
}

/// Probes connectivity with periodic TCP connects
#[derive(Debug, Clone)]
pub struct TcpProbeReachability {
    probe_addr: String,
    interval: Duration,
    timeout: Duration,
}

impl TcpProbeReachability {
    pub fn new(probe_addr: impl Into<String>, interval: Duration, timeout: Duration) -> Self {
        Self {
            probe_addr: probe_addr.into(),
            interval,
            timeout,
        }
    }
}

impl ReachabilityMonitor for TcpProbeReachability {
    fn start(&self) -> Result<watch::Receiver<bool>> {
        let addr: SocketAddr = self.probe_addr.parse().map_err(|e| {
            Error::Config(format!("invalid probe address {:?}: {}", self.probe_addr, e))
        })?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Config(format!("reachability needs a tokio runtime: {}", e)))?;

        // Assume connected until the first probe says otherwise
        let (tx, rx) = watch::channel(true);
        let interval = self.interval;
        let timeout = self.timeout;

        runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = ticker.tick() => {}
                }
                let connected = matches!(
                    tokio::time::timeout(timeout, TcpStream::connect(addr)).await,
                    Ok(Ok(_))
                );
                let changed = tx.send_if_modified(|current| {
                    let changed = *current != connected;
                    *current = connected;
                    changed
                });
                if changed {
                    info!("Reachability via {}: connected={}", addr, connected);
                } else {
                    debug!("Reachability probe {}: connected={}", addr, connected);
                }
            }
            debug!("Reachability probe for {} stopped", addr);
        });

        Ok(rx)
    }
}

/// Host-driven monitor
///
/// Platform integrations (OS network notifications) push transitions in via
/// `set_connected`.
#[derive(Debug, Clone)]
pub struct ManualReachability {
    tx: watch::Sender<bool>,
}

impl ManualReachability {
    pub fn new(connected: bool) -> Self {
        let (tx, _) = watch::channel(connected);
        Self { tx }
    }

    pub fn set_connected(&self, connected: bool) {
        self.tx.send_if_modified(|current| {
            let changed = *current != connected;
            *current = connected;
            changed
        });
    }

    pub fn is_connected(&self) -> bool {
        *self.tx.borrow()
    }
}

impl ReachabilityMonitor for ManualReachability {
    fn start(&self) -> Result<watch::Receiver<bool>> {
        Ok(self.tx.subscribe())
    }
}
