//! Temp-file-then-rename writes with modification-time conflict detection
//!
//! An [`AtomicFile`] stages new contents for one target path in a temporary
//! file created next to it, so the final rename never crosses a filesystem
//! boundary. Readers of the target see either the old bytes or the new
//! bytes, never a prefix of the new ones.
//!
//! # Conflict detection
//!
//! The handle records the wall-clock time at which it was opened. At commit
//! time the target's modification time is compared against it: a target
//! modified strictly after that instant means another writer replaced it in
//! the meantime, and [`JarError::Conflict`] is returned instead of renaming.
//!
//! This is an optimistic check, not a lock. Two commits landing inside one
//! timestamp-resolution window, a writer that preserves mtime, or a rename
//! that slips in between the stat and our own rename all go undetected and
//! the later rename wins.

use crate::io::error::JarError;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::NamedTempFile;
use tracing::debug;

/// Suffix shared by every staging file so stray ones are easy to spot
pub const TEMP_SUFFIX: &str = ".tmp";

/// One in-flight attempt to replace a target file
///
/// Created by [`AtomicFile::open`], written through its [`Write`] impl and
/// resolved by exactly one of [`commit`](AtomicFile::commit) or
/// [`cancel`](AtomicFile::cancel). Both are no-ops once the handle is
/// resolved; dropping an unresolved handle cancels it.
#[derive(Debug)]
pub struct AtomicFile {
    target: PathBuf,
    file: Option<NamedTempFile>,
    temp_path: PathBuf,
    created_at: SystemTime,
}

impl AtomicFile {
    /// Create a uniquely named staging file in the target's directory
    ///
    /// # Errors
    ///
    /// Returns [`JarError::Io`] if the directory does not exist or is not
    /// writable, or if `target` has no file name component.
    pub fn open(target: impl AsRef<Path>) -> Result<Self, JarError> {
        let target = target.as_ref().to_path_buf();
        let dir = staging_dir(&target);
        let name = target.file_name().ok_or_else(|| {
            JarError::io(
                &target,
                io::Error::new(io::ErrorKind::InvalidInput, "target has no file name"),
            )
        })?;

        let prefix = format!(".{}.", name.to_string_lossy());
        let file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&dir)
            .map_err(|e| JarError::io(&dir, e))?;
        let created_at = SystemTime::now();
        let temp_path = file.path().to_path_buf();

        debug!(path = %target.display(), temp = %temp_path.display(), "opened pending write");

        Ok(Self {
            target,
            file: Some(file),
            temp_path,
            created_at,
        })
    }

    /// Path this handle will replace on commit
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Path of the staging file (gone once the handle is resolved)
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Wall-clock time captured when the handle was opened
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Whether commit or cancel has already resolved this handle
    pub fn is_resolved(&self) -> bool {
        self.file.is_none()
    }

    /// Discard the staging file
    ///
    /// Safe to call any number of times, including after a commit. A staging
    /// file that is already gone counts as success.
    pub fn cancel(&mut self) -> Result<(), JarError> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        match file.close() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(JarError::io(&self.temp_path, e)),
        }
    }

    /// Flush the staging file and rename it over the target
    ///
    /// Returns [`JarError::Conflict`] without touching the target if the
    /// target's modification time is after [`created_at`](Self::created_at).
    /// Every error path, the conflict included, removes the staging file
    /// before returning.
    pub fn commit(&mut self) -> Result<(), JarError> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };

        if let Err(e) = file.as_file().sync_all() {
            discard(file.into_temp_path());
            return Err(JarError::io(&self.temp_path, e));
        }
        // Closes the descriptor; the path is still deleted on drop.
        let staged = file.into_temp_path();

        match fs::metadata(&self.target) {
            Ok(meta) => {
                let modified = match meta.modified() {
                    Ok(modified) => modified,
                    Err(e) => {
                        discard(staged);
                        return Err(JarError::io(&self.target, e));
                    }
                };
                if modified > self.created_at {
                    debug!(path = %self.target.display(), "target is newer than pending write");
                    discard(staged);
                    return Err(JarError::Conflict {
                        path: self.target.clone(),
                    });
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                discard(staged);
                return Err(JarError::io(&self.target, e));
            }
        }

        staged.persist(&self.target).map_err(|e| {
            discard(e.path);
            JarError::io(&self.target, e.error)
        })?;

        debug!(path = %self.target.display(), "committed pending write");
        Ok(())
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.write(buf),
            None => Err(resolved_error()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Err(resolved_error()),
        }
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        let _ = self.cancel();
    }
}

fn staging_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn discard(path: tempfile::TempPath) {
    let _ = path.close(); // Ignore errors on cleanup
}

fn resolved_error() -> io::Error {
    io::Error::other("pending write already committed or cancelled")
}
