//! Error types for jar persistence

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving a jar
#[derive(Error, Debug)]
pub enum JarError {
    /// `save` was called before any path was loaded or assigned
    #[error("save called on a jar with no path (load or set_path first)")]
    NotLoaded,

    /// File I/O error (create, write, flush, stat, rename)
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Document could not be encoded or decoded
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The target was modified after the pending write was opened.
    ///
    /// Only [`AtomicFile::commit`](crate::io::atomic::AtomicFile::commit)
    /// returns this; `Store::save` consumes it and retries.
    #[error("{path} was modified by another writer since this write began")]
    Conflict { path: PathBuf },

    /// The configured attempt budget ran out before a save landed
    #[error("gave up saving {path} after {attempts} attempts")]
    RetryLimit { path: PathBuf, attempts: u32 },
}

impl JarError {
    /// True for the retry signal, false for every fatal error
    pub fn is_conflict(&self) -> bool {
        matches!(self, JarError::Conflict { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        JarError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        JarError::Json {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_distinguishable() {
        let conflict = JarError::Conflict {
            path: PathBuf::from("cookies.json"),
        };
        assert!(conflict.is_conflict());

        let fatal = JarError::io(
            "cookies.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!fatal.is_conflict());
        assert!(!JarError::NotLoaded.is_conflict());
    }

    #[test]
    fn test_error_messages_name_the_path() {
        let err = JarError::RetryLimit {
            path: PathBuf::from("/tmp/jar.json"),
            attempts: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/jar.json"));
        assert!(msg.contains('3'));
    }
}
