//! Storage locations and filesystem primitives for the pipeline.
//!
//! Inputs and outputs are addressed through [`DataLocation`], which
//! abstracts over storage backends. The current version supports the local
//! filesystem; an object-store variant is the designed extension point, and
//! any credentials it needs will be carried inside the variant itself,
//! never injected through process-wide environment mutation.
//!
//! The helpers here cover exactly what the pipeline needs:
//!
//! - a recursive, deterministically-ordered listing of `.json` input files,
//! - whole-file reads for line-delimited JSON,
//! - remove-then-recreate of a table output directory (full-rebuild
//!   overwrite semantics),
//! - atomic write-then-rename for the final Parquet files.

use std::{
    io,
    path::{Path, PathBuf},
};

use snafu::{Backtrace, prelude::*};
use tokio::fs;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Location of an input or output dataset root.
///
/// Currently only the local filesystem is supported. A future object-store
/// variant would carry its endpoint and credentials explicitly, e.g.
/// `S3 { bucket, prefix, credentials }`.
#[derive(Debug, Clone)]
pub enum DataLocation {
    /// A dataset rooted at a local filesystem directory.
    Local(PathBuf),
}

impl DataLocation {
    /// Create a location for a local filesystem root.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        DataLocation::Local(root.into())
    }

    /// Parse a string specification into a [`DataLocation`].
    ///
    /// Anything that looks like a URL scheme (`s3://…`, `gs://…`) is
    /// rejected as unsupported; everything else is treated as a local path.
    pub fn parse(spec: &str) -> StorageResult<Self> {
        let trimmed = spec.trim();
        ensure!(
            !trimmed.is_empty(),
            UnsupportedSnafu {
                location: "<empty>".to_string(),
            }
        );
        ensure!(
            !trimmed.contains("://"),
            UnsupportedSnafu {
                location: trimmed.to_string(),
            }
        );

        Ok(DataLocation::Local(PathBuf::from(trimmed)))
    }

    /// Join this location with a relative path into an absolute local path.
    fn join_local(&self, rel: &Path) -> PathBuf {
        match self {
            DataLocation::Local(root) => root.join(rel),
        }
    }
}

/// Errors that can occur during storage operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    /// The specified path was not found.
    #[snafu(display("Path not found: {path}"))]
    NotFound {
        /// The path that was not found.
        path: String,
        /// Underlying I/O error that caused the failure.
        source: io::Error,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// The location specification names a backend this build does not support.
    #[snafu(display("Unsupported storage location: {location}"))]
    Unsupported {
        /// The rejected location specification.
        location: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// Any other local filesystem I/O error.
    #[snafu(display("I/O error at {path}: {source}"))]
    OtherIo {
        /// The path where the I/O error occurred.
        path: String,
        /// Underlying I/O error with platform-specific details.
        source: io::Error,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },
}

/// Recursively list every `.json` file under `rel_dir` inside `location`.
///
/// Returned paths are relative to `location` and sorted lexicographically,
/// so repeated runs visit input files in the same order. A missing dataset
/// root is a [`StorageError::NotFound`]; the caller treats that as fatal,
/// unlike record-level faults inside the files.
pub async fn list_json_files(
    location: &DataLocation,
    rel_dir: &Path,
) -> StorageResult<Vec<PathBuf>> {
    let root = location.join_local(rel_dir);

    // Surface a missing root as NotFound before descending.
    match fs::metadata(&root).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(StorageError::NotFound {
                path: root.display().to_string(),
                source: io::Error::other("not a directory"),
                backtrace: Backtrace::capture(),
            });
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(e).context(NotFoundSnafu {
                path: root.display().to_string(),
            });
        }
        Err(e) => {
            return Err(e).context(OtherIoSnafu {
                path: root.display().to_string(),
            });
        }
    }

    let mut files = Vec::new();
    let mut pending = vec![rel_dir.to_path_buf()];

    while let Some(rel) = pending.pop() {
        let abs = location.join_local(&rel);
        let mut entries = fs::read_dir(&abs).await.context(OtherIoSnafu {
            path: abs.display().to_string(),
        })?;

        while let Some(entry) = entries.next_entry().await.context(OtherIoSnafu {
            path: abs.display().to_string(),
        })? {
            let child = rel.join(entry.file_name());
            let file_type = entry.file_type().await.context(OtherIoSnafu {
                path: abs.display().to_string(),
            })?;

            if file_type.is_dir() {
                pending.push(child);
            } else if child.extension().is_some_and(|ext| ext == "json") {
                files.push(child);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Read the file at `rel_path` within `location` into a `String`.
pub async fn read_to_string(location: &DataLocation, rel_path: &Path) -> StorageResult<String> {
    let abs = location.join_local(rel_path);

    match fs::read_to_string(&abs).await {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(e).context(NotFoundSnafu {
            path: abs.display().to_string(),
        }),
        Err(e) => Err(e).context(OtherIoSnafu {
            path: abs.display().to_string(),
        }),
    }
}

/// Remove and recreate the directory at `rel_dir` inside `location`.
///
/// This is the overwrite step of the full rebuild: any previous output for
/// the table disappears before the new files are written. A directory that
/// does not exist yet is not an error.
pub async fn replace_dir(location: &DataLocation, rel_dir: &Path) -> StorageResult<()> {
    let abs = location.join_local(rel_dir);

    match fs::remove_dir_all(&abs).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).context(OtherIoSnafu {
                path: abs.display().to_string(),
            });
        }
    }

    fs::create_dir_all(&abs).await.context(OtherIoSnafu {
        path: abs.display().to_string(),
    })
}

/// Guard that removes a temporary file on drop unless disarmed.
/// Ensures cleanup on error paths during atomic writes.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    /// Disarm after a successful rename so the renamed file survives.
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            // Best-effort cleanup; we're likely already handling another error.
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Write `contents` to `rel_path` inside `location` atomically.
///
/// The payload is written to a sibling temp file, synced, and renamed into
/// place, so readers never observe a half-written Parquet file. Parent
/// directories are created as needed.
pub async fn write_atomic(
    location: &DataLocation,
    rel_path: &Path,
    contents: &[u8],
) -> StorageResult<()> {
    use tokio::io::AsyncWriteExt;

    let abs = location.join_local(rel_path);

    if let Some(parent) = abs.parent() {
        fs::create_dir_all(parent).await.context(OtherIoSnafu {
            path: parent.display().to_string(),
        })?;
    }

    let tmp_path = abs.with_extension("tmp");
    let mut guard = TempFileGuard::new(tmp_path.clone());

    {
        let mut file = fs::File::create(&tmp_path).await.context(OtherIoSnafu {
            path: tmp_path.display().to_string(),
        })?;

        file.write_all(contents).await.context(OtherIoSnafu {
            path: tmp_path.display().to_string(),
        })?;

        file.sync_all().await.context(OtherIoSnafu {
            path: tmp_path.display().to_string(),
        })?;
    }

    fs::rename(&tmp_path, &abs).await.context(OtherIoSnafu {
        path: abs.display().to_string(),
    })?;

    guard.disarm();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_accepts_local_paths() -> TestResult {
        let loc = DataLocation::parse("/data/input")?;
        assert!(matches!(loc, DataLocation::Local(_)));
        Ok(())
    }

    #[test]
    fn parse_rejects_url_schemes_and_empty() {
        assert!(matches!(
            DataLocation::parse("s3://bucket/prefix"),
            Err(StorageError::Unsupported { .. })
        ));
        assert!(matches!(
            DataLocation::parse("   "),
            Err(StorageError::Unsupported { .. })
        ));
    }

    #[tokio::test]
    async fn list_json_files_is_recursive_and_sorted() -> TestResult {
        let tmp = TempDir::new()?;
        let location = DataLocation::local(tmp.path());

        tokio::fs::create_dir_all(tmp.path().join("logs/2018/11")).await?;
        tokio::fs::write(tmp.path().join("logs/b.json"), "{}").await?;
        tokio::fs::write(tmp.path().join("logs/a.json"), "{}").await?;
        tokio::fs::write(tmp.path().join("logs/2018/11/events.json"), "{}").await?;
        tokio::fs::write(tmp.path().join("logs/notes.txt"), "ignored").await?;

        let files = list_json_files(&location, Path::new("logs")).await?;
        let names: Vec<String> = files
            .iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(
            names,
            vec!["logs/2018/11/events.json", "logs/a.json", "logs/b.json"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn list_json_files_missing_root_is_not_found() -> TestResult {
        let tmp = TempDir::new()?;
        let location = DataLocation::local(tmp.path());

        let result = list_json_files(&location, Path::new("missing")).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn replace_dir_clears_previous_contents() -> TestResult {
        let tmp = TempDir::new()?;
        let location = DataLocation::local(tmp.path());

        tokio::fs::create_dir_all(tmp.path().join("song/year=2000")).await?;
        tokio::fs::write(tmp.path().join("song/year=2000/old.parquet"), "old").await?;

        replace_dir(&location, Path::new("song")).await?;

        assert!(tmp.path().join("song").is_dir());
        assert!(!tmp.path().join("song/year=2000").exists());
        Ok(())
    }

    #[tokio::test]
    async fn replace_dir_creates_missing_directory() -> TestResult {
        let tmp = TempDir::new()?;
        let location = DataLocation::local(tmp.path());

        replace_dir(&location, Path::new("fresh")).await?;
        assert!(tmp.path().join("fresh").is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn write_atomic_writes_and_leaves_no_temp_file() -> TestResult {
        let tmp = TempDir::new()?;
        let location = DataLocation::local(tmp.path());

        write_atomic(&location, Path::new("nested/dir/file.bin"), b"payload").await?;

        let abs = tmp.path().join("nested/dir/file.bin");
        assert_eq!(tokio::fs::read(&abs).await?, b"payload");
        assert!(!tmp.path().join("nested/dir/file.tmp").exists());
        Ok(())
    }

    #[tokio::test]
    async fn write_atomic_overwrites_existing_file() -> TestResult {
        let tmp = TempDir::new()?;
        let location = DataLocation::local(tmp.path());
        let rel = Path::new("table/part-00000.parquet");

        write_atomic(&location, rel, b"first run").await?;
        write_atomic(&location, rel, b"second run").await?;

        let read_back = tokio::fs::read(tmp.path().join(rel)).await?;
        assert_eq!(read_back, b"second run");
        Ok(())
    }

    #[tokio::test]
    async fn read_to_string_missing_file_is_not_found() -> TestResult {
        let tmp = TempDir::new()?;
        let location = DataLocation::local(tmp.path());

        let result = read_to_string(&location, Path::new("absent.json")).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
        Ok(())
    }
}
