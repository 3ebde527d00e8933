//! # starlog
//!
//! Batch ETL that turns raw music-streaming session logs and a song/artist
//! catalog (line-delimited JSON) into a star schema of partitioned Parquet
//! tables: four dimensions (song, artist, user, time) and one fact table
//! (songplay).
//!
//! This crate is the supported public entry point and provides a small,
//! stable surface.
//!
//! ## Example
//!
//! ```rust,ignore
//! use starlog::prelude::*;
//!
//! let input = DataLocation::parse("/data/raw")?;
//! let output = DataLocation::parse("/data/warehouse")?;
//! let report = starlog::run(&input, &output).await?;
//! println!("{} songplays", report.songplays);
//! ```

/// Convenience prelude with the stable, supported surface.
pub mod prelude;

/// Row types for the five output tables.
pub mod model {
    pub use starlog_core::model::{ArtistRow, SongRow, SongplayRow, TimeRow, UserRow};
}

pub use starlog_core::pipeline::{PipelineError, PipelineReport, PipelineResult, run};
pub use starlog_core::storage::{DataLocation, StorageError};
