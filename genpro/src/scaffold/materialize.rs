//! Writing generated files to disk
//!
//! [`FileWriter::write`] applies the overwrite policy:
//!
//! 1. The content is formatted first; a formatting failure writes nothing.
//! 2. An existing file is an error unless overwriting is enabled.
//! 3. With overwriting enabled, the existing file is renamed to
//!    `<path>.<YYYY.MM.DD.hh.mm.ss>.bak` (a counter is added if that name is
//!    taken).
//! 4. Parent directories are created and the new content is written to a
//!    temporary sibling, then renamed into place.
//!
//! If step 4 fails after a backup was taken, the backup is moved back so the
//! original file is never left missing.

use super::format::format_source;
use crate::error::FsError;
use chrono::Local;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Timestamp format for backup file names, second precision
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y.%m.%d.%H.%M.%S";

/// What a successful write did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file did not exist before
    Created,
    /// The file existed and was moved to `backup`
    Replaced {
        /// Where the previous content now lives
        backup: PathBuf,
    },
}

/// Writes generated content under the configured overwrite policy
#[derive(Debug, Clone, Copy)]
pub struct FileWriter {
    overwrite: bool,
}

impl FileWriter {
    /// Create a writer
    #[must_use]
    pub const fn new(overwrite: bool) -> Self {
        Self { overwrite }
    }

    /// Format and write `content` to `path`
    ///
    /// # Errors
    ///
    /// - [`FsError::FormatFailed`] if the content does not format; nothing is touched
    /// - [`FsError::FileAlreadyExists`] if `path` exists and overwriting is disabled
    /// - [`FsError::BackupFailed`] if the existing file cannot be renamed
    /// - [`FsError::CreateDir`] / [`FsError::Write`] if writing fails; any
    ///   backup is restored first
    pub fn write(&self, path: &Path, content: &str) -> Result<WriteOutcome, FsError> {
        let formatted = format_source(path, content)?;

        let exists = path.exists();
        if exists && !self.overwrite {
            return Err(FsError::FileAlreadyExists(path.to_path_buf()));
        }

        let backup = if exists {
            let backup = Self::backup(path)?;
            tracing::info!(path = %path.display(), backup = %backup.display(), "backed up existing file");
            Some(backup)
        } else {
            None
        };

        if let Err(err) = Self::write_new(path, &formatted) {
            if let Some(backup) = &backup {
                match fs::rename(backup, path) {
                    Ok(()) => tracing::info!(path = %path.display(), "restored backup after failed write"),
                    Err(e) => tracing::error!(
                        path = %path.display(),
                        backup = %backup.display(),
                        error = %e,
                        "failed to restore backup"
                    ),
                }
            }
            return Err(err);
        }

        Ok(backup.map_or(WriteOutcome::Created, |backup| WriteOutcome::Replaced { backup }))
    }

    /// Pick a free backup name for `path` and rename the file to it
    fn backup(path: &Path) -> Result<PathBuf, FsError> {
        let stamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut backup = Self::suffixed(path, &format!(".{stamp}.bak"));
        let mut n = 0_u32;
        while backup.exists() {
            n += 1;
            backup = Self::suffixed(path, &format!(".{stamp}.{n}.bak"));
        }

        fs::rename(path, &backup).map_err(|source| FsError::BackupFailed {
            path: path.to_path_buf(),
            backup: backup.clone(),
            source,
        })?;
        Ok(backup)
    }

    fn write_new(path: &Path, content: &str) -> Result<(), FsError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| FsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let staging = Self::suffixed(path, ".genpro-tmp");
        let write_error = |source| FsError::Write {
            path: path.to_path_buf(),
            source,
        };
        fs::write(&staging, content).map_err(write_error)?;
        if let Err(source) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(write_error(source));
        }
        Ok(())
    }

    fn suffixed(path: &Path, suffix: &str) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }
}

/// Backup files that exist next to `path`
///
/// # Errors
///
/// Returns the I/O error from listing the parent directory.
pub fn list_backups(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(Vec::new());
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let prefix = format!("{file_name}.");

    let mut backups: Vec<PathBuf> = fs::read_dir(parent)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".bak"))
        })
        .collect();
    backups.sort();
    Ok(backups)
}
