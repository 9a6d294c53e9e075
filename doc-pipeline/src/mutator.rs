//! Crash-safe file mutation: backup, write, rollback.
//!
//! [`FileMutator::apply`] leaves the target either fully rewritten or
//! byte-identical to what it was before the call, and never leaves a backup
//! file behind. The only exception is a failed rollback, reported as the
//! fatal [`MutationError::RollbackFailed`] with the backup kept on disk.

use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Final write step, separated out so tests can inject faults.
pub trait ContentWriter: Send + Sync {
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// Plain `std::fs::write`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl ContentWriter for FsWriter {
    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        fs::write(path, content)
    }
}

#[derive(Debug, Error)]
pub enum MutationError {
    /// Nothing was modified.
    #[error("failed to back up {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The write failed and the original content was restored.
    #[error("failed to write {path} (original restored): {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The write failed and so did the restore. The backup is left in place.
    #[error("failed to write {path} ({write}) and to restore it from {backup} ({rollback})")]
    RollbackFailed {
        path: PathBuf,
        backup: PathBuf,
        write: io::Error,
        rollback: io::Error,
    },

    /// The blocking task died before reporting a result.
    #[error("mutation of {path} was interrupted: {detail}")]
    Interrupted { path: PathBuf, detail: String },
}

impl MutationError {
    /// `true` when the file may be left in an unknown state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RollbackFailed { .. } | Self::Interrupted { .. })
    }
}

/// Applies new content to files through a transient backup.
#[derive(Debug, Clone)]
pub struct FileMutator<W: ContentWriter = FsWriter> {
    backup_suffix: String,
    writer: W,
}

impl FileMutator<FsWriter> {
    pub fn new(backup_suffix: impl Into<String>) -> Self {
        Self::with_writer(backup_suffix, FsWriter)
    }
}

impl<W: ContentWriter> FileMutator<W> {
    pub fn with_writer(backup_suffix: impl Into<String>, writer: W) -> Self {
        Self {
            backup_suffix: backup_suffix.into(),
            writer,
        }
    }

    /// `path` with the backup suffix appended to its file name.
    pub fn backup_path(&self, path: &Path) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(&self.backup_suffix);
        PathBuf::from(name)
    }

    /// Replace the content of `path` with `content`.
    ///
    /// Sequence: drop a stale backup, copy `path` to the backup, write,
    /// then drop the backup. A failed write renames the backup over `path`.
    pub fn apply(&self, path: &Path, content: &str) -> Result<(), MutationError> {
        let backup = self.backup_path(path);
        let backup_err = |source| MutationError::Backup {
            path: path.to_path_buf(),
            source,
        };

        if backup.exists() {
            debug!("mutator: removing stale backup {}", backup.display());
            fs::remove_file(&backup).map_err(backup_err)?;
        }
        if let Err(e) = fs::copy(path, &backup) {
            let _ = fs::remove_file(&backup);
            return Err(backup_err(e));
        }

        match self.writer.write(path, content) {
            Ok(()) => {
                if let Err(e) = fs::remove_file(&backup) {
                    warn!("mutator: could not remove backup {}: {}", backup.display(), e);
                }
                debug!("mutator: wrote {} bytes to {}", content.len(), path.display());
                Ok(())
            }
            Err(write) => match fs::rename(&backup, path) {
                Ok(()) => {
                    warn!("mutator: write failed, restored {}: {}", path.display(), write);
                    Err(MutationError::Write {
                        path: path.to_path_buf(),
                        source: write,
                    })
                }
                Err(rollback) => {
                    error!(
                        "mutator: ROLLBACK FAILED for {} (backup kept at {}): write={}, rollback={}",
                        path.display(),
                        backup.display(),
                        write,
                        rollback
                    );
                    Err(MutationError::RollbackFailed {
                        path: path.to_path_buf(),
                        backup,
                        write,
                        rollback,
                    })
                }
            },
        }
    }
}

impl<W: ContentWriter + 'static> FileMutator<W> {
    /// Runs [`apply`](Self::apply) on the blocking pool.
    ///
    /// The mutation runs to completion even when the calling future is
    /// dropped, so cancellation never interrupts it halfway.
    pub async fn apply_blocking(self: Arc<Self>, path: PathBuf, content: String) -> Result<(), MutationError> {
        let task_path = path.clone();
        tokio::task::spawn_blocking(move || self.apply(&task_path, &content))
            .await
            .map_err(|e| MutationError::Interrupted {
                path,
                detail: e.to_string(),
            })?
    }
}
