//! Wrapper prelude.
//!
//! The `starlog` crate is the supported public entry point. Downstream code
//! should prefer importing from this prelude instead of depending on
//! internal core module paths.

pub use crate::model::{ArtistRow, SongRow, SongplayRow, TimeRow, UserRow};
pub use crate::{DataLocation, PipelineError, PipelineReport, PipelineResult, StorageError, run};
