//! Station and Track value objects

use serde::{Deserialize, Serialize};
use url::Url;

/// A radio station as supplied by the station catalog
///
/// Immutable once loaded; equality is structural over all five fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Station {
    pub name: String,
    #[serde(rename = "streamURL")]
    pub stream_url: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[serde(rename = "desc")]
    pub short_desc: String,
    #[serde(rename = "longDesc")]
    pub long_desc: String,
}

impl Station {
    /// Parse the stream URL
    pub fn parse_stream_url(&self) -> crate::Result<Url> {
        Ok(Url::parse(self.stream_url.trim())?)
    }

    /// Remote station image, if the image reference is an http(s) URL
    ///
    /// Catalogs may also reference bundled image names, which are left to
    /// the presentation layer.
    pub fn remote_image_url(&self) -> Option<Url> {
        let url = Url::parse(self.image_url.trim()).ok()?;
        matches!(url.scheme(), "http" | "https").then_some(url)
    }

    /// Text shown in the artist slot while no track metadata is known
    pub fn default_artist(&self) -> &str {
        if self.short_desc.trim().is_empty() {
            &self.long_desc
        } else {
            &self.short_desc
        }
    }
}

/// The currently playing track of a stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    /// Cover art location, if any
    pub artwork_url: Option<Url>,
    /// True once artwork was resolved from track metadata (station images
    /// used as placeholders leave this false)
    pub artwork_loaded: bool,
}

impl Track {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            artwork_url: None,
            artwork_loaded: false,
        }
    }

    /// Track placeholder built from station defaults
    pub fn for_station(station: &Station) -> Self {
        Self {
            title: station.name.clone(),
            artist: station.default_artist().to_string(),
            artwork_url: station.remote_image_url(),
            artwork_loaded: false,
        }
    }
}
