//! In-memory transformations from extracted rows to derived tables.
//!
//! Both builders here are pure functions over their inputs:
//!
//! - [`time_dim`] expands the distinct play-event timestamps into the time
//!   dimension.
//! - [`songplays`] reconstructs play events as fact rows by joining the
//!   logs against the catalog on the weak `(song title, artist name)` key.
//!
//! Neither builder touches storage, and record-level timestamp faults are
//! skipped with a warning rather than raised; the only fatal failures in
//! the pipeline are I/O.

pub mod songplays;
pub mod time_dim;
