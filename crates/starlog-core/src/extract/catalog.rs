//! Catalog Extractor: song and artist dimensions from `song_data/`.
//!
//! Each catalog record describes one song together with its artist. The
//! extractor validates the three required identifiers (`song_id`,
//! `artist_id`, `title`), projects the record into the song and artist
//! dimensions, and deduplicates each dimension by its key with
//! last-write-wins: the catalog is assumed canonical per id, so a later
//! record simply replaces an earlier one.
//!
//! Optional attributes (location, coordinates) never cause a record to be
//! dropped; absent `year`/`duration` fall back to the catalog's own
//! unknown-value conventions (0 and 0.0).

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::extract::{ExtractReport, ExtractResult, parse_ndjson_dataset};
use crate::model::{ArtistRow, CatalogEntry, SongRow};
use crate::storage::DataLocation;

/// Directory under the input root holding catalog JSON files.
pub const SONG_DATA_DIR: &str = "song_data";

/// Song and artist dimension tables extracted from the catalog.
#[derive(Debug, Clone)]
pub struct CatalogTables {
    /// Song dimension rows, unique per `song_id`, sorted by key.
    pub songs: Vec<SongRow>,
    /// Artist dimension rows, unique per `artist_id`, sorted by key.
    pub artists: Vec<ArtistRow>,
    /// Extraction counters.
    pub report: ExtractReport,
}

/// Serde target for one raw catalog line; everything optional so that
/// validation (not deserialization) decides what is a skippable record.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(default)]
    song_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist_id: Option<String>,
    #[serde(default)]
    artist_name: Option<String>,
    #[serde(default)]
    artist_location: Option<String>,
    #[serde(default)]
    artist_latitude: Option<f64>,
    #[serde(default)]
    artist_longitude: Option<f64>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    duration: Option<f64>,
}

fn require(field: &'static str, value: Option<String>) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            warn!("skipping catalog record: missing required field `{field}`");
            None
        }
    }
}

/// Parse and validate one catalog line; `None` means skip (already logged).
fn parse_catalog_line(line: &str) -> Option<CatalogEntry> {
    let record: CatalogRecord = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!("skipping malformed catalog record: {e}");
            return None;
        }
    };

    let song_id = require("song_id", record.song_id)?;
    let artist_id = require("artist_id", record.artist_id)?;
    let title = require("title", record.title)?;

    Some(CatalogEntry {
        song_id,
        title,
        artist_id,
        // Name falls back to the id so the artist row stays joinable.
        artist_name: record.artist_name.unwrap_or_default(),
        artist_location: record.artist_location.filter(|l| !l.is_empty()),
        artist_latitude: record.artist_latitude,
        artist_longitude: record.artist_longitude,
        year: record.year.unwrap_or(0),
        duration: record.duration.unwrap_or(0.0),
    })
}

/// Read `song_data/` and build the song and artist dimension tables.
///
/// Record-level faults are skipped and counted; only storage failures
/// abort. Output rows are sorted by key so reruns produce identical tables.
pub async fn extract_catalog(input: &DataLocation) -> ExtractResult<CatalogTables> {
    let (entries, report) =
        parse_ndjson_dataset(input, Path::new(SONG_DATA_DIR), SONG_DATA_DIR, |line| {
            parse_catalog_line(line)
        })
        .await?;

    // Last-write-wins dedup per key; BTreeMap keeps the output ordering
    // stable across runs.
    let mut songs: BTreeMap<String, SongRow> = BTreeMap::new();
    let mut artists: BTreeMap<String, ArtistRow> = BTreeMap::new();

    for entry in entries {
        songs.insert(
            entry.song_id.clone(),
            SongRow {
                song_id: entry.song_id,
                title: entry.title,
                artist_id: entry.artist_id.clone(),
                year: entry.year,
                duration: entry.duration,
            },
        );
        artists.insert(
            entry.artist_id.clone(),
            ArtistRow {
                artist_id: entry.artist_id,
                name: entry.artist_name,
                location: entry.artist_location,
                latitude: entry.artist_latitude,
                longitude: entry.artist_longitude,
            },
        );
    }

    Ok(CatalogTables {
        songs: songs.into_values().collect(),
        artists: artists.into_values().collect(),
        report,
    })
}
