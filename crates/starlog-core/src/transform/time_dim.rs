//! Time Dimension Builder.
//!
//! One row per *distinct* timestamp among play events. Timestamps that
//! never appear in a play event get no row, and duplicate plays at the same
//! instant collapse into one row, so `start_time` is unique by
//! construction.

use std::collections::BTreeSet;

use log::warn;

use crate::calendar;
use crate::model::{LogEvent, TimeRow};

/// Build the time dimension from the filtered play-event sequence.
///
/// Rows come back in ascending timestamp order. A timestamp the calendar
/// decomposer rejects is skipped with a warning; extraction already
/// filtered negative values, so this only fires for out-of-range extremes.
pub fn build_time_dimension(plays: &[LogEvent]) -> Vec<TimeRow> {
    let distinct: BTreeSet<i64> = plays.iter().map(|e| e.ts).collect();

    let mut rows = Vec::with_capacity(distinct.len());
    for ts in distinct {
        match calendar::decompose_millis(ts) {
            Ok(parts) => rows.push(TimeRow {
                start_time: parts.start_time,
                hour: parts.hour,
                day: parts.day,
                week: parts.week,
                month: parts.month,
                year: parts.year,
                weekday: parts.weekday,
            }),
            Err(e) => warn!("skipping time row for timestamp {ts}: {e}"),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(ts: i64) -> LogEvent {
        LogEvent {
            user_id: Some("10".into()),
            first_name: None,
            last_name: None,
            gender: None,
            level: Some("paid".into()),
            song: Some("Test Track".into()),
            artist: Some("Test Artist".into()),
            length: Some(180.0),
            session_id: 5,
            location: None,
            user_agent: Some("UA".into()),
            page: "NextSong".into(),
            ts,
        }
    }

    #[test]
    fn one_row_per_distinct_timestamp() {
        let plays = vec![play(2_000), play(1_000), play(2_000)];
        let rows = build_time_dimension(&plays);

        assert_eq!(rows.len(), 2);
        // Ascending ts order.
        assert_eq!(rows[0].start_time, "1970-01-01T00:00:01.000Z");
        assert_eq!(rows[1].start_time, "1970-01-01T00:00:02.000Z");
    }

    #[test]
    fn decomposed_fields_match_calendar() {
        let rows = build_time_dimension(&[play(1_541_990_258_796)]);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.start_time, "2018-11-12T02:37:38.796Z");
        assert_eq!(row.hour, 2);
        assert_eq!(row.day, 12);
        assert_eq!(row.week, "46");
        assert_eq!(row.month, 11);
        assert_eq!(row.year, 2018);
        assert_eq!(row.weekday, 0);
    }

    #[test]
    fn empty_input_yields_empty_table() {
        assert!(build_time_dimension(&[]).is_empty());
    }

    #[test]
    fn out_of_range_timestamp_is_skipped() {
        let rows = build_time_dimension(&[play(i64::MAX), play(1_000)]);
        assert_eq!(rows.len(), 1);
    }
}
