//! Typed rows for the raw inputs and the star-schema output tables.
//!
//! The raw entities (`CatalogEntry`, `LogEvent`) are what the extractors
//! produce after validating loosely-structured JSON records. The table rows
//! (`SongRow`, `ArtistRow`, `UserRow`, `TimeRow`, `SongplayRow`) are the
//! five output tables of the star schema; the `writer` module maps each of
//! them onto a fixed Arrow schema.
//!
//! None of these types mutate after creation; every run derives all rows
//! fresh from the source data.

/// One validated record from the song/artist catalog.
///
/// Required fields (`song_id`, `artist_id`, `title`) are guaranteed present
/// by the extractor; location and coordinates are genuinely optional in the
/// source data.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Catalog identifier for the song.
    pub song_id: String,
    /// Song title.
    pub title: String,
    /// Catalog identifier for the performing artist.
    pub artist_id: String,
    /// Artist display name.
    pub artist_name: String,
    /// Free-text artist location, when known.
    pub artist_location: Option<String>,
    /// Artist latitude, when known.
    pub artist_latitude: Option<f64>,
    /// Artist longitude, when known.
    pub artist_longitude: Option<f64>,
    /// Release year; the catalog uses 0 for unknown.
    pub year: i32,
    /// Track duration in seconds.
    pub duration: f64,
}

/// One validated session-log event.
///
/// `page` and a non-negative `ts` are guaranteed by the extractor. Most
/// other attributes are optional because non-play events (auth, home,
/// settings pages) carry only a subset of them. An empty-string `userId`
/// in the source (logged-out traffic) is normalized to `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    /// User identifier, absent for logged-out traffic.
    pub user_id: Option<String>,
    /// User first name.
    pub first_name: Option<String>,
    /// User last name.
    pub last_name: Option<String>,
    /// User gender.
    pub gender: Option<String>,
    /// Subscription level at the time of the event (`free` / `paid`).
    pub level: Option<String>,
    /// Title of the song being played, for play events.
    pub song: Option<String>,
    /// Artist name as recorded in the log, for play events.
    pub artist: Option<String>,
    /// Play length in seconds, for play events.
    pub length: Option<f64>,
    /// Session identifier.
    pub session_id: i64,
    /// Free-text user location.
    pub location: Option<String>,
    /// User agent string of the client.
    pub user_agent: Option<String>,
    /// Page that generated the event; play events use `NextSong`.
    pub page: String,
    /// Event time as epoch milliseconds.
    pub ts: i64,
}

/// Row of the song dimension table, keyed by `song_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct SongRow {
    /// Unique song identifier.
    pub song_id: String,
    /// Song title.
    pub title: String,
    /// Identifier of the performing artist.
    pub artist_id: String,
    /// Release year (0 when unknown in the catalog).
    pub year: i32,
    /// Track duration in seconds.
    pub duration: f64,
}

/// Row of the artist dimension table, keyed by `artist_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRow {
    /// Unique artist identifier.
    pub artist_id: String,
    /// Artist display name.
    pub name: String,
    /// Free-text location, when known.
    pub location: Option<String>,
    /// Latitude, when known.
    pub latitude: Option<f64>,
    /// Longitude, when known.
    pub longitude: Option<f64>,
}

/// Row of the user dimension table, keyed by `user_id`.
///
/// When a user appears in multiple events, the latest event (by `ts`) wins
/// for `level`, since a subscription can change mid-session.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    /// Unique user identifier.
    pub user_id: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Gender.
    pub gender: Option<String>,
    /// Most recent subscription level.
    pub level: Option<String>,
}

/// Row of the time dimension table, keyed by `start_time`.
///
/// One row exists per *distinct* play-event timestamp; all fields come from
/// [`crate::calendar::decompose_millis`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRow {
    /// RFC3339 UTC timestamp with millisecond precision.
    pub start_time: String,
    /// Hour of day, 0-23.
    pub hour: u32,
    /// Day of month, 1-31.
    pub day: u32,
    /// ISO week number as a string.
    pub week: String,
    /// Month of year, 1-12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Day of week, Monday = 0.
    pub weekday: u32,
}

/// Row of the songplay fact table.
///
/// `song_id` and `artist_id` are `None` when the weak-key catalog join found
/// no match; the play is still recorded. `year` and `month` are derived from
/// `start_time` and double as the partition keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SongplayRow {
    /// Play time, RFC3339 UTC with millisecond precision. References a
    /// `TimeRow` built from the same event set.
    pub start_time: String,
    /// User who played the song, if logged in.
    pub user_id: Option<String>,
    /// Subscription level at play time.
    pub level: Option<String>,
    /// Matched catalog song, when the join resolved.
    pub song_id: Option<String>,
    /// Matched catalog artist, when the join resolved.
    pub artist_id: Option<String>,
    /// Session identifier.
    pub session_id: i64,
    /// Free-text user location from the event.
    pub location: Option<String>,
    /// User agent string from the event.
    pub user_agent: Option<String>,
    /// Calendar year of `start_time` (partition key).
    pub year: i32,
    /// Month of `start_time` (partition key).
    pub month: u32,
}
