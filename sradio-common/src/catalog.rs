//! Station catalog decoding
//!
//! Catalogs come either as a bare JSON array of stations or wrapped in a
//! `{"station": [...]}` document. Missing fields decode to empty strings.

use crate::model::Station;
use crate::Result;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Wrapped { station: Vec<Station> },
    Bare(Vec<Station>),
}

/// Decode a station catalog, preserving order
pub fn parse_stations(json: &str) -> Result<Vec<Station>> {
    let stations = match serde_json::from_str::<CatalogDocument>(json)? {
        CatalogDocument::Wrapped { station } => station,
        CatalogDocument::Bare(stations) => stations,
    };
    tracing::debug!("Decoded {} stations", stations.len());
    Ok(stations)
}

/// Read and decode a station catalog file
pub fn load_stations(path: &std::path::Path) -> Result<Vec<Station>> {
    let json = std::fs::read_to_string(path)?;
    parse_stations(&json)
}

/// Case-insensitive name search, preserving catalog order
pub fn filter_stations<'a>(stations: &'a [Station], query: &str) -> Vec<&'a Station> {
    let needle = query.to_lowercase();
    stations
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .collect()
}
