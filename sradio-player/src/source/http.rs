//! HTTP transport for Icecast and other HTTP/1.x stream servers
//!
//! Handles connection, buffering health and ICY metadata. Decoding is left to
//! the platform: while playing, audio payload is forwarded to an optional
//! output channel, otherwise it is counted and dropped.
//!
//! The response validated by `load` is handed to the reader on `attach`, so
//! a station costs one listener slot. Legacy Shoutcast v1 servers that answer
//! with an `ICY 200 OK` status line are not HTTP and fail validation.

use super::icy::IcyParser;
use super::{ItemEvent, ItemEventSink, PlayableAsset, StreamSource};
use crate::error::{Error, Result};
use futures::future::BoxFuture;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Response};
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use url::Url;

const USER_AGENT: &str = concat!("sradio/", env!("CARGO_PKG_VERSION"));

/// Buffering thresholds for the HTTP reader
#[derive(Debug, Clone)]
pub struct HttpSourceSettings {
    /// No data for this long counts as an empty buffer
    pub stall_timeout: Duration,
    /// Bytes that must arrive before the buffer is likely to keep up
    pub prebuffer_bytes: usize,
}

impl Default for HttpSourceSettings {
    fn default() -> Self {
        Self {
            stall_timeout: Duration::from_secs(2),
            prebuffer_bytes: 32 * 1024,
        }
    }
}

struct ActiveItem {
    url: Url,
    reader: JoinHandle<()>,
}

/// Open response from the last successful `load`
struct ValidatedResponse {
    url: Url,
    response: Response,
}

/// `StreamSource` backed by reqwest
pub struct HttpStreamSource {
    client: Client,
    settings: HttpSourceSettings,
    current: Option<ActiveItem>,
    validated: Arc<Mutex<Option<ValidatedResponse>>>,
    playing: Arc<AtomicBool>,
    keep_up: Arc<AtomicBool>,
    volume: f32,
    output: Option<mpsc::Sender<Vec<u8>>>,
}

impl HttpStreamSource {
    pub fn new(settings: HttpSourceSettings) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(client, settings))
    }

    pub fn with_client(client: Client, settings: HttpSourceSettings) -> Self {
        Self {
            client,
            settings,
            current: None,
            validated: Arc::new(Mutex::new(None)),
            playing: Arc::new(AtomicBool::new(false)),
            keep_up: Arc::new(AtomicBool::new(false)),
            volume: 1.0,
            output: None,
        }
    }

    /// Forward audio payload to a platform decoder while playing
    pub fn with_audio_output(mut self, output: mpsc::Sender<Vec<u8>>) -> Self {
        self.output = Some(output);
        self
    }

    /// Volume the platform decoder should apply
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Take the response validated for `url`, if it is still open
    fn take_validated(&self, url: &Url) -> Option<Response> {
        let validated = self.validated.lock().ok()?.take()?;
        if &validated.url == url {
            Some(validated.response)
        } else {
            debug!("Dropping validated response for {}", validated.url);
            None
        }
    }
}

impl StreamSource for HttpStreamSource {
    fn load(&self, url: &Url) -> BoxFuture<'static, Result<PlayableAsset>> {
        let client = self.client.clone();
        let validated = self.validated.clone();
        let url = url.clone();
        Box::pin(async move {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::AssetUnplayable(format!(
                    "{}: HTTP source cannot open {} URLs",
                    url,
                    url.scheme()
                )));
            }

            let response = open_stream(&client, &url)
                .await
                .map_err(|e| Error::AssetUnplayable(format!("{}: {}", url, e)))?;

            if !response.status().is_success() {
                return Err(Error::AssetUnplayable(format!(
                    "{}: HTTP {}",
                    url,
                    response.status()
                )));
            }

            let headers = response.headers();
            let content_type = header_str(headers, CONTENT_TYPE.as_str());
            if !is_audio_content_type(content_type.as_deref()) {
                return Err(Error::AssetUnplayable(format!(
                    "{}: unsupported content type {:?}",
                    url, content_type
                )));
            }

            let asset = PlayableAsset {
                url: url.clone(),
                content_type,
                metaint: header_str(headers, "icy-metaint").and_then(|v| v.parse().ok()),
                bitrate_kbps: header_str(headers, "icy-br").and_then(|v| v.parse().ok()),
                station_name: header_str(headers, "icy-name"),
            };
            debug!("Validated stream asset: {:?}", asset);

            if let Ok(mut slot) = validated.lock() {
                *slot = Some(ValidatedResponse { url, response });
            }
            Ok(asset)
        })
    }

    fn attach(&mut self, asset: &PlayableAsset, events: ItemEventSink) {
        self.detach();

        let response = self.take_validated(&asset.url);
        let reader = ItemReader {
            url: asset.url.clone(),
            events,
            settings: self.settings.clone(),
            playing: self.playing.clone(),
            keep_up: self.keep_up.clone(),
            output: self.output.clone(),
        };
        self.keep_up.store(false, Ordering::SeqCst);
        let reader = tokio::spawn(read_item(self.client.clone(), response, reader));
        info!("Attached stream {}", asset.url);
        self.current = Some(ActiveItem {
            url: asset.url.clone(),
            reader,
        });
    }

    fn detach(&mut self) {
        if let Some(item) = self.current.take() {
            // Aborting drops the reader's ItemEventSink
            item.reader.abort();
            self.keep_up.store(false, Ordering::SeqCst);
            info!("Detached stream {}", item.url);
        }
    }

    fn play(&mut self) {
        self.playing.store(true, Ordering::SeqCst);
    }

    fn pause(&mut self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn is_likely_to_keep_up(&self) -> bool {
        self.current.is_some() && self.keep_up.load(Ordering::SeqCst)
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }
}

impl Drop for HttpStreamSource {
    fn drop(&mut self) {
        self.detach();
    }
}

async fn open_stream(client: &Client, url: &Url) -> reqwest::Result<Response> {
    client
        .get(url.clone())
        .header("Icy-MetaData", "1")
        .send()
        .await
}

/// Reader-side state for one attached item
struct ItemReader {
    url: Url,
    events: ItemEventSink,
    settings: HttpSourceSettings,
    playing: Arc<AtomicBool>,
    keep_up: Arc<AtomicBool>,
    output: Option<mpsc::Sender<Vec<u8>>>,
}

/// Stream one item, reusing the validated response when there is one
async fn read_item(client: Client, validated: Option<Response>, reader: ItemReader) {
    let response = match validated {
        Some(response) => response,
        None => match open_stream(&client, &reader.url)
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(response) => response,
            Err(e) => {
                reader.events.emit(ItemEvent::Failed(e.to_string()));
                return;
            }
        },
    };

    let metaint = header_str(response.headers(), "icy-metaint").and_then(|v| v.parse().ok());
    reader.pump(response.bytes_stream(), metaint).await;
}

impl ItemReader {
    /// Drive the item's event contract from a body stream until it ends
    async fn pump<S, B, E>(self, body: S, metaint: Option<usize>)
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        let mut body = std::pin::pin!(body);
        let mut parser = IcyParser::new(metaint);
        self.events.emit(ItemEvent::Ready);

        let mut buffered = 0usize;
        let mut stalled = true;
        let mut last_title: Option<String> = None;
        let mut played_bytes = 0u64;

        loop {
            match tokio::time::timeout(self.settings.stall_timeout, body.next()).await {
                Ok(Some(Ok(chunk))) => {
                    let out = parser.push(chunk.as_ref());

                    for title in out.titles {
                        if last_title.as_deref() != Some(title.as_str()) {
                            last_title = Some(title.clone());
                            self.events.emit(ItemEvent::TimedMetadata(Some(title)));
                        }
                    }

                    buffered += out.audio.len();
                    if stalled && buffered >= self.settings.prebuffer_bytes {
                        stalled = false;
                        self.keep_up.store(true, Ordering::SeqCst);
                        self.events.emit(ItemEvent::BufferOk(true));
                    }

                    if self.playing.load(Ordering::SeqCst) && !out.audio.is_empty() {
                        played_bytes += out.audio.len() as u64;
                        if let Some(output) = &self.output {
                            // Drop audio rather than block the transport
                            let _ = output.try_send(out.audio);
                        }
                        trace!("{} bytes handed to output", played_bytes);
                    }
                }
                Ok(None) => {
                    warn!("Stream {} ended", self.url);
                    self.keep_up.store(false, Ordering::SeqCst);
                    self.events.emit(ItemEvent::Failed("stream ended".to_string()));
                    return;
                }
                Ok(Some(Err(e))) => {
                    warn!("Stream {} read error: {}", self.url, e);
                    self.keep_up.store(false, Ordering::SeqCst);
                    self.events.emit(ItemEvent::Failed(e.to_string()));
                    return;
                }
                Err(_) => {
                    if !stalled {
                        debug!("No data from {} for {:?}", self.url, self.settings.stall_timeout);
                        stalled = true;
                        buffered = 0;
                        self.keep_up.store(false, Ordering::SeqCst);
                        self.events.emit(ItemEvent::BufferEmpty);
                    }
                }
            }
        }
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Content types the transport accepts as a playable stream
pub fn is_audio_content_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return true;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("audio/") || mime == "application/ogg" || mime == "application/octet-stream"
}
