//! Timestamped backup copies of configuration files
//!
//! Backups are stored flat in a backup directory as
//! `<original file name>.<YYYYMMDD_HHMMSS>.backup`. A second backup of
//! the same file within the same second gets a counter,
//! `<original file name>.<YYYYMMDD_HHMMSS>.<n>.backup`, so earlier copies
//! are never overwritten.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::{Error, Result};

/// Extension appended to every backup file.
pub const BACKUP_EXTENSION: &str = "backup";

/// Timestamp layout used in backup file names.
const BACKUP_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Build the backup file name for `source` taken at `at`.
pub fn backup_file_name<Tz>(source: &Path, at: &DateTime<Tz>) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    Ok(format!("{}.{}", backup_stem(source, at)?, BACKUP_EXTENSION))
}

fn backup_stem<Tz>(source: &Path, at: &DateTime<Tz>) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let name = source.file_name().ok_or_else(|| Error::NoFileName {
        path: source.to_path_buf(),
    })?;
    Ok(format!("{}.{}", name.to_string_lossy(), at.format(BACKUP_STAMP_FORMAT)))
}

/// Create the first free backup file for `stem`, appending a counter on collision.
fn create_unique(backup_dir: &Path, stem: &str) -> Result<(PathBuf, File)> {
    let mut attempt = 0u32;
    loop {
        let name = match attempt {
            0 => format!("{stem}.{BACKUP_EXTENSION}"),
            n => format!("{stem}.{n}.{BACKUP_EXTENSION}"),
        };
        let path = backup_dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(Error::io(&path, e)),
        }
    }
}

/// Copy `source` into `backup_dir` under a timestamped name.
///
/// Returns `Ok(None)` when `source` does not exist; there is nothing to
/// preserve in that case.
pub fn create_backup<Tz>(
    source: &Path,
    backup_dir: &Path,
    at: &DateTime<Tz>,
) -> Result<Option<PathBuf>>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if !source.exists() {
        return Ok(None);
    }

    fs::create_dir_all(backup_dir).map_err(|e| Error::io(backup_dir, e))?;

    let (backup_path, mut backup) = create_unique(backup_dir, &backup_stem(source, at)?)?;
    let mut original = File::open(source).map_err(|e| Error::io(source, e))?;
    io::copy(&mut original, &mut backup).map_err(|e| Error::io(&backup_path, e))?;

    tracing::info!(backup = %backup_path.display(), "Created backup");
    Ok(Some(backup_path))
}
