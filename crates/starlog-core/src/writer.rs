//! Columnar Writer: partitioned Parquet output for the star schema.
//!
//! Each table implements [`StarTable`], which fixes its output directory
//! name, partition key columns, and Arrow schema. [`write_table`] groups
//! rows by their partition key values and writes one Parquet file per
//! partition under Hive-style `key=value` path segments, e.g.
//!
//! ```text
//! <output>/time/year=2018/month=11/part-00000.parquet
//! ```
//!
//! Unpartitioned tables write a single file at the table root. The previous
//! output for the table is removed first: a run fully replaces what a prior
//! run wrote, which is what makes retries idempotent. Partition columns are
//! also kept inside the files so each file is self-describing.

pub mod batches;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use snafu::prelude::*;

use crate::storage::{self, DataLocation, StorageError};

/// Result alias for write operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// File name used for each partition's Parquet file.
///
/// A single-process run writes one file per partition, so the index is
/// always zero; the numbered form matches what distributed engines emit
/// and keeps readers' glob patterns unsurprised.
pub const PART_FILE_NAME: &str = "part-00000.parquet";

/// Errors that can occur while writing a table.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum WriteError {
    /// The rows could not be assembled into an Arrow batch.
    #[snafu(display("Failed to build Arrow batch for table {table}"))]
    BuildBatch {
        /// Output table name.
        table: String,
        /// Underlying Arrow failure.
        source: ArrowError,
    },

    /// The Arrow batch could not be encoded as Parquet.
    #[snafu(display("Failed to encode Parquet for table {table}"))]
    EncodeParquet {
        /// Output table name.
        table: String,
        /// Underlying Parquet failure.
        source: ParquetError,
    },

    /// The encoded files could not be written to the output location.
    #[snafu(display("Failed to write table {table} to storage"))]
    TableStorage {
        /// Output table name.
        table: String,
        /// Underlying storage failure.
        source: StorageError,
    },
}

/// A star-schema table that can be persisted as a partitioned Parquet
/// dataset.
pub trait StarTable: Sized {
    /// Output directory name under the output root.
    const NAME: &'static str;

    /// Partition key column names, outermost first. Empty means the table
    /// is written unpartitioned.
    fn partition_columns() -> &'static [&'static str];

    /// This row's partition key values, aligned with
    /// [`StarTable::partition_columns`].
    fn partition_values(&self) -> Vec<String>;

    /// Assemble rows into a single Arrow record batch with the table's
    /// fixed schema.
    fn to_record_batch(rows: &[&Self]) -> Result<RecordBatch, ArrowError>;
}

/// Make a partition value safe to embed in a path segment.
fn sanitize_partition_value(raw: &str) -> String {
    if raw.is_empty() {
        return "unknown".to_string();
    }
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn encode_parquet(batch: &RecordBatch) -> Result<Vec<u8>, ParquetError> {
    let mut buf = Vec::new();
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(buf)
}

/// Write `rows` as the table `T` under the output location, replacing any
/// previous output for that table.
///
/// Partitions are written in sorted key order, one file each. An empty
/// table still produces its (empty) output directory.
pub async fn write_table<T: StarTable>(output: &DataLocation, rows: &[T]) -> WriteResult<()> {
    storage::replace_dir(output, Path::new(T::NAME))
        .await
        .context(TableStorageSnafu { table: T::NAME })?;

    // Group by the *sanitized* key values: distinct raw keys that map to
    // the same path segment must land in the same file, not overwrite each
    // other. BTreeMap gives a stable partition write order across runs.
    let mut partitions: BTreeMap<Vec<String>, Vec<&T>> = BTreeMap::new();
    for row in rows {
        let key: Vec<String> = row
            .partition_values()
            .iter()
            .map(|v| sanitize_partition_value(v))
            .collect();
        partitions.entry(key).or_default().push(row);
    }

    for (values, part_rows) in &partitions {
        debug_assert_eq!(values.len(), T::partition_columns().len());

        let mut rel = PathBuf::from(T::NAME);
        for (col, val) in T::partition_columns().iter().zip(values) {
            rel.push(format!("{col}={val}"));
        }
        rel.push(PART_FILE_NAME);

        let batch =
            T::to_record_batch(part_rows).context(BuildBatchSnafu { table: T::NAME })?;
        let payload = encode_parquet(&batch).context(EncodeParquetSnafu { table: T::NAME })?;

        storage::write_atomic(output, &rel, &payload)
            .await
            .context(TableStorageSnafu { table: T::NAME })?;
    }

    Ok(())
}
