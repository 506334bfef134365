//! Stream metadata resolution: title parsing and cover art lookup

pub mod artwork;
pub mod parse;

pub use artwork::{rewrite_artwork_size, ArtworkResolver, DEFAULT_ARTWORK_SIZE};
pub use parse::{parse_stream_title, TrackMetadata};
