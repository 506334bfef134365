//! Timed-metadata text parsing
//!
//! Stream titles arrive as `"<artist> - <track>"`. Anything that does not
//! follow the pattern is kept as the track title.

/// Separator between artist and track in stream titles
pub const TITLE_SEPARATOR: &str = " - ";

/// Artist/track pair extracted from a stream title
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackMetadata {
    pub artist: Option<String>,
    pub title: Option<String>,
}

/// Parse raw timed metadata
///
/// Returns `None` for missing or blank metadata; callers reset the track to
/// station defaults in that case.
pub fn parse_stream_title(raw: Option<&str>) -> Option<TrackMetadata> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }

    let metadata = match raw.split_once(TITLE_SEPARATOR) {
        Some((artist, title)) => TrackMetadata {
            artist: non_empty(artist),
            title: non_empty(title),
        },
        None => TrackMetadata {
            artist: None,
            title: non_empty(raw),
        },
    };

    if metadata.artist.is_none() && metadata.title.is_none() {
        return None;
    }
    Some(metadata)
}

fn non_empty(part: &str) -> Option<String> {
    let part = part.trim();
    (!part.is_empty()).then(|| part.to_string())
}
