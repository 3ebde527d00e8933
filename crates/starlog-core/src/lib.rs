//! Core engine for the starlog batch ETL.
//!
//! This crate turns two line-delimited JSON datasets (a song/artist catalog
//! and music-streaming session logs) into a denormalized star schema
//! persisted as partitioned Parquet datasets:
//!
//! - Typed row definitions for the raw records and the five output tables
//!   (`model` module).
//! - A pure UTC timestamp decomposer that expands epoch milliseconds into
//!   calendar attributes (`calendar` module).
//! - Extractors that read the catalog and log datasets, skipping malformed
//!   records instead of aborting the run (`extract` module).
//! - The time-dimension builder and the weak-key songplay fact join
//!   (`transform` module).
//! - A storage abstraction over the input/output locations with atomic
//!   write-then-rename semantics (`storage` module).
//! - A partitioned Parquet writer with Hive-style `key=value` directory
//!   layout and full-rebuild overwrite semantics (`writer` module).
//! - The pipeline orchestrator wiring the stages together (`pipeline`
//!   module).
//!
//! The job is a full rebuild: every run derives all five tables from scratch
//! and replaces any previous output at the same paths, so a failed run can
//! simply be retried.
#![deny(missing_docs)]
pub mod calendar;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod storage;
pub mod transform;
pub mod writer;
