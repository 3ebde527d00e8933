//! Songplay Fact Builder: the weak-key join between logs and catalog.
//!
//! The two sources share no surrogate key, so a play event is matched to
//! the catalog by exact `(song title, artist name)` equality, with the
//! additional constraint that the matched song's `artist_id` agrees with
//! the matched artist: the catalog's own song/artist relationship must
//! hold, not just two independent name hits. The matching rule is a fixed
//! contract: no normalization, no fuzzy matching.
//!
//! A play with no catalog match is still a play. Unmatched events produce
//! fact rows with null `song_id`/`artist_id` instead of being dropped.

use std::collections::{HashMap, HashSet};

use log::warn;

use crate::calendar;
use crate::model::{ArtistRow, LogEvent, SongRow, SongplayRow};

/// Resolved catalog identifiers for a `(title, artist name)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CatalogIds {
    song_id: String,
    artist_id: String,
}

/// Lookup index from `(song title, artist name)` to catalog identifiers.
///
/// Only song/artist pairs whose ids agree across the two dimension tables
/// are indexed; a song row pointing at an artist id the artist table does
/// not contain can never match.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    by_title_and_name: HashMap<(String, String), CatalogIds>,
}

impl CatalogIndex {
    /// Build the index from the extracted song and artist dimensions.
    pub fn build(songs: &[SongRow], artists: &[ArtistRow]) -> Self {
        let artists_by_id: HashMap<&str, &ArtistRow> = artists
            .iter()
            .map(|a| (a.artist_id.as_str(), a))
            .collect();

        let mut by_title_and_name = HashMap::new();
        for song in songs {
            // Cross-check: the song's artist_id must resolve in the artist
            // table for the pairing to count.
            let Some(artist) = artists_by_id.get(song.artist_id.as_str()) else {
                continue;
            };
            by_title_and_name.insert(
                (song.title.clone(), artist.name.clone()),
                CatalogIds {
                    song_id: song.song_id.clone(),
                    artist_id: artist.artist_id.clone(),
                },
            );
        }

        Self { by_title_and_name }
    }

    /// Number of joinable `(title, name)` pairs.
    pub fn len(&self) -> usize {
        self.by_title_and_name.len()
    }

    /// Whether the index holds no joinable pairs.
    pub fn is_empty(&self) -> bool {
        self.by_title_and_name.is_empty()
    }

    fn resolve(&self, song: &str, artist: &str) -> Option<&CatalogIds> {
        self.by_title_and_name
            .get(&(song.to_string(), artist.to_string()))
    }
}

/// Build the songplay fact table from the play events and catalog index.
///
/// Every play event yields exactly one fact row unless it is an exact
/// duplicate of an earlier one (the logs contain replayed entries) or its
/// timestamp cannot be decomposed (skipped with a warning, same as the
/// time dimension). Input order is preserved.
pub fn build_songplays(plays: &[LogEvent], index: &CatalogIndex) -> Vec<SongplayRow> {
    let mut seen: HashSet<SongplayRow> = HashSet::new();
    let mut rows = Vec::with_capacity(plays.len());

    for event in plays {
        let parts = match calendar::decompose_millis(event.ts) {
            Ok(parts) => parts,
            Err(e) => {
                warn!("skipping play event at ts {}: {e}", event.ts);
                continue;
            }
        };

        let ids = match (&event.song, &event.artist) {
            (Some(song), Some(artist)) => index.resolve(song, artist),
            _ => None,
        };

        let row = SongplayRow {
            start_time: parts.start_time,
            user_id: event.user_id.clone(),
            level: event.level.clone(),
            song_id: ids.map(|i| i.song_id.clone()),
            artist_id: ids.map(|i| i.artist_id.clone()),
            session_id: event.session_id,
            location: event.location.clone(),
            user_agent: event.user_agent.clone(),
            year: parts.year,
            month: parts.month,
        };

        if seen.insert(row.clone()) {
            rows.push(row);
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> (Vec<SongRow>, Vec<ArtistRow>) {
        let songs = vec![
            SongRow {
                song_id: "SOSAMPLE".into(),
                title: "Test Track".into(),
                artist_id: "AR1".into(),
                year: 2000,
                duration: 180.0,
            },
            // Same title under an artist id missing from the artist table:
            // must never be joinable.
            SongRow {
                song_id: "SOGHOST".into(),
                title: "Test Track".into(),
                artist_id: "AR_MISSING".into(),
                year: 2001,
                duration: 200.0,
            },
        ];
        let artists = vec![ArtistRow {
            artist_id: "AR1".into(),
            name: "Test Artist".into(),
            location: None,
            latitude: None,
            longitude: None,
        }];
        (songs, artists)
    }

    fn play(song: &str, artist: &str, ts: i64) -> LogEvent {
        LogEvent {
            user_id: Some("10".into()),
            first_name: None,
            last_name: None,
            gender: None,
            level: Some("paid".into()),
            song: Some(song.into()),
            artist: Some(artist.into()),
            length: Some(180.0),
            session_id: 5,
            location: Some("SF".into()),
            user_agent: Some("UA".into()),
            page: "NextSong".into(),
            ts,
        }
    }

    #[test]
    fn index_requires_artist_id_agreement() {
        let (songs, artists) = catalog();
        let index = CatalogIndex::build(&songs, &artists);

        assert_eq!(index.len(), 1);
        let ids = index.resolve("Test Track", "Test Artist").unwrap();
        assert_eq!(ids.song_id, "SOSAMPLE");
        assert_eq!(ids.artist_id, "AR1");
        assert!(index.resolve("Test Track", "Other Artist").is_none());
    }

    #[test]
    fn matched_play_resolves_catalog_ids() {
        let (songs, artists) = catalog();
        let index = CatalogIndex::build(&songs, &artists);

        let rows = build_songplays(&[play("Test Track", "Test Artist", 1_541_990_258_796)], &index);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.start_time, "2018-11-12T02:37:38.796Z");
        assert_eq!(row.user_id.as_deref(), Some("10"));
        assert_eq!(row.level.as_deref(), Some("paid"));
        assert_eq!(row.song_id.as_deref(), Some("SOSAMPLE"));
        assert_eq!(row.artist_id.as_deref(), Some("AR1"));
        assert_eq!(row.session_id, 5);
        assert_eq!(row.user_agent.as_deref(), Some("UA"));
        assert_eq!((row.year, row.month), (2018, 11));
    }

    #[test]
    fn unmatched_play_is_kept_with_null_keys() {
        let (songs, artists) = catalog();
        let index = CatalogIndex::build(&songs, &artists);

        let rows = build_songplays(&[play("Unknown Track", "Test Artist", 1_541_990_258_796)], &index);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].song_id, None);
        assert_eq!(rows[0].artist_id, None);
        assert_eq!(rows[0].user_id.as_deref(), Some("10"));
    }

    #[test]
    fn title_match_alone_is_not_enough() {
        let (songs, artists) = catalog();
        let index = CatalogIndex::build(&songs, &artists);

        // Right title, wrong artist name: must stay unmatched.
        let rows = build_songplays(&[play("Test Track", "Imposter", 1_000)], &index);
        assert_eq!(rows[0].song_id, None);
    }

    #[test]
    fn exact_duplicates_collapse_to_one_row() {
        let (songs, artists) = catalog();
        let index = CatalogIndex::build(&songs, &artists);

        let event = play("Test Track", "Test Artist", 1_541_990_258_796);
        let rows = build_songplays(&[event.clone(), event.clone(), event], &index);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn same_song_different_sessions_are_distinct_rows() {
        let (songs, artists) = catalog();
        let index = CatalogIndex::build(&songs, &artists);

        let mut second = play("Test Track", "Test Artist", 1_541_990_258_796);
        second.session_id = 6;
        let rows = build_songplays(
            &[play("Test Track", "Test Artist", 1_541_990_258_796), second],
            &index,
        );
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn play_without_song_metadata_keeps_null_keys() {
        let (songs, artists) = catalog();
        let index = CatalogIndex::build(&songs, &artists);

        let mut event = play("x", "y", 1_000);
        event.song = None;
        event.artist = None;
        let rows = build_songplays(&[event], &index);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].song_id, None);
    }
}
