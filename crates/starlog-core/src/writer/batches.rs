//! Arrow schemas and batch assembly for the five output tables.
//!
//! The schemas here are the contract for downstream query engines; keep
//! column names and nullability in sync with the row types in
//! [`crate::model`].

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, Int32Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::model::{ArtistRow, SongRow, SongplayRow, TimeRow, UserRow};
use crate::writer::StarTable;

impl StarTable for SongRow {
    const NAME: &'static str = "song";

    fn partition_columns() -> &'static [&'static str] {
        &["year", "artist_id"]
    }

    fn partition_values(&self) -> Vec<String> {
        vec![self.year.to_string(), self.artist_id.clone()]
    }

    fn to_record_batch(rows: &[&Self]) -> Result<RecordBatch, ArrowError> {
        let mut song_id = StringBuilder::new();
        let mut title = StringBuilder::new();
        let mut artist_id = StringBuilder::new();
        let mut year = Int32Builder::new();
        let mut duration = Float64Builder::new();

        for row in rows {
            song_id.append_value(&row.song_id);
            title.append_value(&row.title);
            artist_id.append_value(&row.artist_id);
            year.append_value(row.year);
            duration.append_value(row.duration);
        }

        let schema = Arc::new(Schema::new(vec![
            Field::new("song_id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("year", DataType::Int32, false),
            Field::new("duration", DataType::Float64, false),
        ]));

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(song_id.finish()) as ArrayRef,
                Arc::new(title.finish()),
                Arc::new(artist_id.finish()),
                Arc::new(year.finish()),
                Arc::new(duration.finish()),
            ],
        )
    }
}

impl StarTable for ArtistRow {
    const NAME: &'static str = "artist";

    fn partition_columns() -> &'static [&'static str] {
        &[]
    }

    fn partition_values(&self) -> Vec<String> {
        Vec::new()
    }

    fn to_record_batch(rows: &[&Self]) -> Result<RecordBatch, ArrowError> {
        let mut artist_id = StringBuilder::new();
        let mut name = StringBuilder::new();
        let mut location = StringBuilder::new();
        let mut latitude = Float64Builder::new();
        let mut longitude = Float64Builder::new();

        for row in rows {
            artist_id.append_value(&row.artist_id);
            name.append_value(&row.name);
            location.append_option(row.location.as_deref());
            latitude.append_option(row.latitude);
            longitude.append_option(row.longitude);
        }

        let schema = Arc::new(Schema::new(vec![
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("location", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("longitude", DataType::Float64, true),
        ]));

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(artist_id.finish()) as ArrayRef,
                Arc::new(name.finish()),
                Arc::new(location.finish()),
                Arc::new(latitude.finish()),
                Arc::new(longitude.finish()),
            ],
        )
    }
}

impl StarTable for UserRow {
    const NAME: &'static str = "user";

    fn partition_columns() -> &'static [&'static str] {
        &[]
    }

    fn partition_values(&self) -> Vec<String> {
        Vec::new()
    }

    fn to_record_batch(rows: &[&Self]) -> Result<RecordBatch, ArrowError> {
        let mut user_id = StringBuilder::new();
        let mut first_name = StringBuilder::new();
        let mut last_name = StringBuilder::new();
        let mut gender = StringBuilder::new();
        let mut level = StringBuilder::new();

        for row in rows {
            user_id.append_value(&row.user_id);
            first_name.append_option(row.first_name.as_deref());
            last_name.append_option(row.last_name.as_deref());
            gender.append_option(row.gender.as_deref());
            level.append_option(row.level.as_deref());
        }

        let schema = Arc::new(Schema::new(vec![
            Field::new("user_id", DataType::Utf8, false),
            Field::new("first_name", DataType::Utf8, true),
            Field::new("last_name", DataType::Utf8, true),
            Field::new("gender", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
        ]));

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(user_id.finish()) as ArrayRef,
                Arc::new(first_name.finish()),
                Arc::new(last_name.finish()),
                Arc::new(gender.finish()),
                Arc::new(level.finish()),
            ],
        )
    }
}

impl StarTable for TimeRow {
    const NAME: &'static str = "time";

    fn partition_columns() -> &'static [&'static str] {
        &["year", "month"]
    }

    fn partition_values(&self) -> Vec<String> {
        vec![self.year.to_string(), self.month.to_string()]
    }

    fn to_record_batch(rows: &[&Self]) -> Result<RecordBatch, ArrowError> {
        let mut start_time = StringBuilder::new();
        let mut hour = Int32Builder::new();
        let mut day = Int32Builder::new();
        let mut week = StringBuilder::new();
        let mut month = Int32Builder::new();
        let mut year = Int32Builder::new();
        let mut weekday = Int32Builder::new();

        for row in rows {
            start_time.append_value(&row.start_time);
            hour.append_value(row.hour as i32);
            day.append_value(row.day as i32);
            week.append_value(&row.week);
            month.append_value(row.month as i32);
            year.append_value(row.year);
            weekday.append_value(row.weekday as i32);
        }

        let schema = Arc::new(Schema::new(vec![
            Field::new("start_time", DataType::Utf8, false),
            Field::new("hour", DataType::Int32, false),
            Field::new("day", DataType::Int32, false),
            Field::new("week", DataType::Utf8, false),
            Field::new("month", DataType::Int32, false),
            Field::new("year", DataType::Int32, false),
            Field::new("weekday", DataType::Int32, false),
        ]));

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(start_time.finish()) as ArrayRef,
                Arc::new(hour.finish()),
                Arc::new(day.finish()),
                Arc::new(week.finish()),
                Arc::new(month.finish()),
                Arc::new(year.finish()),
                Arc::new(weekday.finish()),
            ],
        )
    }
}

impl StarTable for SongplayRow {
    const NAME: &'static str = "songplay";

    fn partition_columns() -> &'static [&'static str] {
        &["year", "month"]
    }

    fn partition_values(&self) -> Vec<String> {
        vec![self.year.to_string(), self.month.to_string()]
    }

    fn to_record_batch(rows: &[&Self]) -> Result<RecordBatch, ArrowError> {
        let mut start_time = StringBuilder::new();
        let mut user_id = StringBuilder::new();
        let mut level = StringBuilder::new();
        let mut song_id = StringBuilder::new();
        let mut artist_id = StringBuilder::new();
        let mut session_id = Int64Builder::new();
        let mut location = StringBuilder::new();
        let mut user_agent = StringBuilder::new();
        let mut year = Int32Builder::new();
        let mut month = Int32Builder::new();

        for row in rows {
            start_time.append_value(&row.start_time);
            user_id.append_option(row.user_id.as_deref());
            level.append_option(row.level.as_deref());
            song_id.append_option(row.song_id.as_deref());
            artist_id.append_option(row.artist_id.as_deref());
            session_id.append_value(row.session_id);
            location.append_option(row.location.as_deref());
            user_agent.append_option(row.user_agent.as_deref());
            year.append_value(row.year);
            month.append_value(row.month as i32);
        }

        let schema = Arc::new(Schema::new(vec![
            Field::new("start_time", DataType::Utf8, false),
            Field::new("user_id", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
            Field::new("song_id", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("session_id", DataType::Int64, false),
            Field::new("location", DataType::Utf8, true),
            Field::new("user_agent", DataType::Utf8, true),
            Field::new("year", DataType::Int32, false),
            Field::new("month", DataType::Int32, false),
        ]));

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(start_time.finish()) as ArrayRef,
                Arc::new(user_id.finish()),
                Arc::new(level.finish()),
                Arc::new(song_id.finish()),
                Arc::new(artist_id.finish()),
                Arc::new(session_id.finish()),
                Arc::new(location.finish()),
                Arc::new(user_agent.finish()),
                Arc::new(year.finish()),
                Arc::new(month.finish()),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;

    #[test]
    fn songplay_batch_carries_nulls_for_unmatched_keys() {
        let row = SongplayRow {
            start_time: "2018-11-12T02:37:38.796Z".into(),
            user_id: Some("10".into()),
            level: Some("paid".into()),
            song_id: None,
            artist_id: None,
            session_id: 5,
            location: None,
            user_agent: Some("UA".into()),
            year: 2018,
            month: 11,
        };

        let batch = SongplayRow::to_record_batch(&[&row]).unwrap();
        assert_eq!(batch.num_rows(), 1);

        let song_id = batch.column_by_name("song_id").unwrap();
        assert_eq!(song_id.null_count(), 1);
        let session_id = batch.column_by_name("session_id").unwrap();
        assert_eq!(session_id.null_count(), 0);
    }

    #[test]
    fn time_batch_schema_matches_dimension_contract() {
        let row = TimeRow {
            start_time: "2018-11-12T02:37:38.796Z".into(),
            hour: 2,
            day: 12,
            week: "46".into(),
            month: 11,
            year: 2018,
            weekday: 0,
        };

        let batch = TimeRow::to_record_batch(&[&row]).unwrap();
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            vec!["start_time", "hour", "day", "week", "month", "year", "weekday"]
        );
    }
}
