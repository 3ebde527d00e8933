//! Extraction of typed rows from the line-delimited JSON inputs.
//!
//! Two datasets live under the input root: `song_data/` (the song/artist
//! catalog, handled by [`catalog`]) and `log_data/` (session logs, handled
//! by [`events`]). Both are collections of `.json` files containing one
//! JSON record per line.
//!
//! Fault handling follows one rule: a bad *record* (malformed JSON, missing
//! required field, negative timestamp) is skipped with a warning and
//! counted in the [`ExtractReport`]; a bad *dataset* (missing root,
//! unreadable file) aborts the run with an [`ExtractError`].

pub mod catalog;
pub mod events;

use std::path::Path;

use rayon::prelude::*;
use snafu::prelude::*;

use crate::storage::{self, DataLocation, StorageError};

/// Result alias for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Fatal extraction failures (record-level faults are skipped, not raised).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExtractError {
    /// The dataset root could not be listed.
    #[snafu(display("Failed to list {dataset} input files"))]
    ListInputs {
        /// Logical dataset name (`song_data` or `log_data`).
        dataset: String,
        /// Underlying storage failure.
        source: StorageError,
    },

    /// An input file could not be read.
    #[snafu(display("Failed to read {dataset} input file {path}"))]
    ReadFile {
        /// Logical dataset name (`song_data` or `log_data`).
        dataset: String,
        /// The file that failed to read.
        path: String,
        /// Underlying storage failure.
        source: StorageError,
    },
}

/// Counters describing one dataset extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Number of input files visited.
    pub files_read: usize,
    /// Number of non-blank lines parsed successfully.
    pub records_read: u64,
    /// Number of lines skipped (malformed or failing validation).
    pub records_skipped: u64,
}

/// Parse every record of a line-delimited JSON dataset.
///
/// Files are visited in sorted order; lines within a file are parsed in
/// parallel (ordered collect, so output order is deterministic).
/// `parse_line` returns `None` for records that should be skipped and is
/// responsible for logging why.
pub(crate) async fn parse_ndjson_dataset<T, F>(
    location: &DataLocation,
    dataset_dir: &Path,
    dataset: &str,
    parse_line: F,
) -> ExtractResult<(Vec<T>, ExtractReport)>
where
    T: Send,
    F: Fn(&str) -> Option<T> + Sync,
{
    let files = storage::list_json_files(location, dataset_dir)
        .await
        .context(ListInputsSnafu { dataset })?;

    let mut rows = Vec::new();
    let mut report = ExtractReport::default();

    for rel_path in &files {
        let contents =
            storage::read_to_string(location, rel_path)
                .await
                .context(ReadFileSnafu {
                    dataset,
                    path: rel_path.display().to_string(),
                })?;

        let lines: Vec<&str> = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let parsed: Vec<Option<T>> = lines.par_iter().map(|line| parse_line(line)).collect();

        for item in parsed {
            match item {
                Some(row) => {
                    rows.push(row);
                    report.records_read += 1;
                }
                None => report.records_skipped += 1,
            }
        }
        report.files_read += 1;
    }

    Ok((rows, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[tokio::test]
    async fn parses_lines_across_files_in_order() -> TestResult {
        let tmp = TempDir::new()?;
        let location = DataLocation::local(tmp.path());
        tokio::fs::create_dir_all(tmp.path().join("ds")).await?;
        tokio::fs::write(tmp.path().join("ds/a.json"), "1\n2\n\nnot-a-number\n").await?;
        tokio::fs::write(tmp.path().join("ds/b.json"), "3\n").await?;

        let (rows, report) =
            parse_ndjson_dataset(&location, Path::new("ds"), "ds", |line| {
                line.parse::<i64>().ok()
            })
            .await?;

        assert_eq!(rows, vec![1, 2, 3]);
        assert_eq!(report.files_read, 2);
        assert_eq!(report.records_read, 3);
        assert_eq!(report.records_skipped, 1);
        Ok(())
    }

    #[tokio::test]
    async fn missing_dataset_root_is_fatal() -> TestResult {
        let tmp = TempDir::new()?;
        let location = DataLocation::local(tmp.path());

        let result =
            parse_ndjson_dataset::<i64, _>(&location, Path::new("absent"), "absent", |_| None)
                .await;

        assert!(matches!(result, Err(ExtractError::ListInputs { .. })));
        Ok(())
    }
}
