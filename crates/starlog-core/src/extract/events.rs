//! Event Extractor: user dimension and play events from `log_data/`.
//!
//! Session logs carry every page view, not just plays. The user dimension
//! is therefore derived from *all* parsed events (a user's attributes can
//! appear on any page), while the play-event sequence handed to the
//! downstream builders is filtered to `page == "NextSong"`.
//!
//! The source files carry no ordering guarantee, so events are explicitly
//! sorted by `ts` before the user reduction; last-write-wins on `level`
//! then means "latest event wins", which is the intended semantics for a
//! subscription level that can change mid-session.

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::extract::{ExtractReport, ExtractResult, parse_ndjson_dataset};
use crate::model::{LogEvent, UserRow};
use crate::storage::DataLocation;

/// Directory under the input root holding session-log JSON files.
pub const LOG_DATA_DIR: &str = "log_data";

/// `page` value identifying a play event.
pub const PAGE_NEXT_SONG: &str = "NextSong";

/// User dimension and filtered play events extracted from the logs.
#[derive(Debug, Clone)]
pub struct EventTables {
    /// User dimension rows, unique per `user_id`, sorted by key.
    pub users: Vec<UserRow>,
    /// Play events (`page == "NextSong"`) in ascending `ts` order.
    pub plays: Vec<LogEvent>,
    /// Extraction counters.
    pub report: ExtractReport,
}

/// The logs are inconsistent about `userId`: usually a string, sometimes a
/// bare number, and empty for logged-out traffic.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserIdValue {
    Text(String),
    Number(i64),
}

impl UserIdValue {
    fn normalize(self) -> Option<String> {
        match self {
            UserIdValue::Text(s) if s.is_empty() => None,
            UserIdValue::Text(s) => Some(s),
            UserIdValue::Number(n) => Some(n.to_string()),
        }
    }
}

/// Serde target for one raw log line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogRecord {
    #[serde(default)]
    user_id: Option<UserIdValue>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    song: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    length: Option<f64>,
    #[serde(default)]
    session_id: Option<i64>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    ts: Option<i64>,
}

/// Parse and validate one log line; `None` means skip (already logged).
fn parse_log_line(line: &str) -> Option<LogEvent> {
    let record: LogRecord = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!("skipping malformed log record: {e}");
            return None;
        }
    };

    let page = match record.page {
        Some(p) if !p.is_empty() => p,
        _ => {
            warn!("skipping log record: missing required field `page`");
            return None;
        }
    };

    let ts = match record.ts {
        Some(ts) if ts >= 0 => ts,
        Some(ts) => {
            warn!("skipping log record: negative timestamp {ts}");
            return None;
        }
        None => {
            warn!("skipping log record: missing required field `ts`");
            return None;
        }
    };

    Some(LogEvent {
        user_id: record.user_id.and_then(UserIdValue::normalize),
        first_name: record.first_name,
        last_name: record.last_name,
        gender: record.gender,
        level: record.level,
        song: record.song,
        artist: record.artist,
        length: record.length,
        session_id: record.session_id.unwrap_or(0),
        location: record.location,
        user_agent: record.user_agent,
        page,
        ts,
    })
}

fn merge_user(row: &mut UserRow, event: &LogEvent) {
    // Latest event wins; only overwrite with values the event actually has.
    if event.level.is_some() {
        row.level = event.level.clone();
    }
    if event.first_name.is_some() {
        row.first_name = event.first_name.clone();
    }
    if event.last_name.is_some() {
        row.last_name = event.last_name.clone();
    }
    if event.gender.is_some() {
        row.gender = event.gender.clone();
    }
}

/// Read `log_data/` and build the user dimension plus the play-event
/// sequence.
///
/// Users come from every event carrying a `userId`; plays are the
/// `NextSong` subset. Both reflect an explicit ascending sort on `ts`.
pub async fn extract_events(input: &DataLocation) -> ExtractResult<EventTables> {
    let (mut events, report) =
        parse_ndjson_dataset(input, Path::new(LOG_DATA_DIR), LOG_DATA_DIR, |line| {
            parse_log_line(line)
        })
        .await?;

    // Stable sort: events with equal ts keep their file order.
    events.sort_by_key(|e| e.ts);

    let mut users: BTreeMap<String, UserRow> = BTreeMap::new();
    for event in &events {
        let Some(user_id) = event.user_id.clone() else {
            continue;
        };
        users
            .entry(user_id.clone())
            .and_modify(|row| merge_user(row, event))
            .or_insert_with(|| UserRow {
                user_id,
                first_name: event.first_name.clone(),
                last_name: event.last_name.clone(),
                gender: event.gender.clone(),
                level: event.level.clone(),
            });
    }

    let plays: Vec<LogEvent> = events
        .into_iter()
        .filter(|e| e.page == PAGE_NEXT_SONG)
        .collect();

    Ok(EventTables {
        users: users.into_values().collect(),
        plays,
        report,
    })
}
