//! Writing JSON results to timestamped files.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Errors raised while persisting a result.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The value could not be serialized to JSON.
    #[error("Failed to serialize result: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
    /// The destination directory could not be created.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file could not be written, or a file with the same name already exists.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders `now` as an ISO-8601 timestamp safe for file names.
///
/// `:` and `.` are replaced with `-`, so `2023-12-03T08:45:00.000Z`
/// becomes `2023-12-03T08-45-00-000Z`. Names sort chronologically.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// Builds `<prefix>-<timestamp>.json`.
pub fn file_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}-{}.json", timestamp(now))
}

/// Writes `value` as pretty-printed JSON to `dir/<prefix>-<timestamp>.json`.
///
/// The directory is created if needed. Returns the path that was written.
/// An existing file is never overwritten: a name collision is reported as
/// [`Error::Write`].
pub fn write_json<T: Serialize + ?Sized>(
    value: &T,
    dir: &Path,
    prefix: &str,
) -> Result<PathBuf, Error> {
    write_json_at(value, dir, prefix, Utc::now())
}

/// Like [`write_json`] with an explicit timestamp.
pub fn write_json_at<T: Serialize + ?Sized>(
    value: &T,
    dir: &Path,
    prefix: &str,
    now: DateTime<Utc>,
) -> Result<PathBuf, Error> {
    let content = serde_json::to_string_pretty(value).map_err(|source| Error::Serialize { source })?;

    fs::create_dir_all(dir).map_err(|source| Error::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(file_name(prefix, now));
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .and_then(|mut file| file.write_all(content.as_bytes()))
        .map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;

    tracing::info!(path = %path.display(), "Saved result");
    Ok(path)
}
