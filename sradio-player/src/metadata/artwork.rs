//! Cover art lookup via a song-search endpoint
//!
//! Queries `GET <search_url>?term=<text>&entity=song` and takes the first
//! result's `artworkUrl100`. Every failure (HTTP, JSON, missing fields)
//! resolves to `None`; nothing is propagated to the engine.

use crate::error::Result;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Thumbnail size embedded in search results
pub const DEFAULT_ARTWORK_SIZE: u32 = 100;

const DEFAULT_SIZE_TOKEN: &str = "100x100";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "artworkUrl100")]
    artwork_url_100: Option<String>,
}

/// Resolves cover art URLs for stream titles
#[derive(Debug, Clone)]
pub struct ArtworkResolver {
    client: Client,
    search_url: Url,
    size: u32,
}

impl ArtworkResolver {
    pub fn new(search_url: Url, size: u32) -> Self {
        Self::with_client(Client::new(), search_url, size)
    }

    pub fn with_client(client: Client, search_url: Url, size: u32) -> Self {
        Self {
            client,
            search_url,
            size,
        }
    }

    /// Look up artwork for a raw stream title
    pub async fn lookup(&self, term: &str) -> Option<Url> {
        match self.try_lookup(term).await {
            Ok(url) => url,
            Err(e) => {
                debug!("Artwork lookup for {:?} failed: {}", term, e);
                None
            }
        }
    }

    async fn try_lookup(&self, term: &str) -> Result<Option<Url>> {
        let body = self
            .client
            .get(self.search_url.clone())
            .query(&[("term", term), ("entity", "song")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(artwork_from_search_response(&body, self.size))
    }
}

/// Extract the first result's artwork URL, rewritten to `size`
pub fn artwork_from_search_response(body: &str, size: u32) -> Option<Url> {
    let response: SearchResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) => {
            debug!("Malformed search response: {}", e);
            return None;
        }
    };

    let base = response.results.into_iter().next()?.artwork_url_100?;
    Url::parse(&rewrite_artwork_size(&base, size)).ok()
}

/// Replace the default `100x100` thumbnail token with `size`x`size`
///
/// The URL is returned unchanged when `size` is the default or zero.
pub fn rewrite_artwork_size(url: &str, size: u32) -> String {
    if size == DEFAULT_ARTWORK_SIZE || size == 0 {
        return url.to_string();
    }
    match url.rfind(DEFAULT_SIZE_TOKEN) {
        Some(pos) => {
            let mut rewritten = String::with_capacity(url.len() + 4);
            rewritten.push_str(&url[..pos]);
            rewritten.push_str(&format!("{size}x{size}"));
            rewritten.push_str(&url[pos + DEFAULT_SIZE_TOKEN.len()..]);
            rewritten
        }
        None => url.to_string(),
    }
}
