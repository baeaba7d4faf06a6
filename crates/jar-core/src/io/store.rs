//! In-memory jar with conflict-aware save and load
//!
//! A [`Store`] owns one [`Document`] behind a mutex and remembers the path it
//! was loaded from. [`Store::save`] writes the whole document through an
//! [`AtomicFile`]; when the commit reports that another writer replaced the
//! file first, the on-disk document is reloaded, merged on top of ours (disk
//! wins per entry) and the save starts over with a fresh pending write.
//!
//! No file lock is taken. Cross-process ordering rests entirely on the
//! modification-time check in [`AtomicFile::commit`], with the blind spots
//! documented there.

use crate::io::atomic::AtomicFile;
use crate::io::document::{
    decode_document, encode_to_vec, load_document, merge_document, Document, DocumentFormat,
};
use crate::io::error::JarError;
use crate::schema::Cookie;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Label used in errors for stream-based encode/decode
const STREAM_ORIGIN: &str = "<stream>";

/// Upper bound on reload backoff, as a multiple of the base delay
const MAX_BACKOFF_SHIFT: u32 = 4;

/// Tuning for [`Store::save`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistOptions {
    /// Total commit attempts plus failed reloads allowed per save.
    /// `None` or `Some(0)` retries until the save lands.
    pub max_attempts: Option<u32>,
    /// Layout of the written file
    pub format: DocumentFormat,
    /// First delay after a failed reload; doubles up to 16x
    pub reload_backoff: Duration,
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self {
            max_attempts: None,
            format: DocumentFormat::Compact,
            reload_backoff: Duration::from_millis(50),
        }
    }
}

/// Result of a successful [`Store::save`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written on the first attempt
    Clean,

    /// Lost at least one race, merged the winner's entries and retried
    Merged { retries: u32, merged_entries: usize },
}

/// Mutex-guarded jar document plus the path it persists to
#[derive(Debug)]
pub struct Store<R = Cookie> {
    document: Mutex<Document<R>>,
    path: Mutex<Option<PathBuf>>,
    options: PersistOptions,
}

impl<R> Default for Store<R> {
    fn default() -> Self {
        Self::with_options(PersistOptions::default())
    }
}

impl<R> Store<R> {
    /// Empty store with default options and no remembered path
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PersistOptions) -> Self {
        Self {
            document: Mutex::new(Document::new()),
            path: Mutex::new(None),
            options,
        }
    }

    pub fn options(&self) -> &PersistOptions {
        &self.options
    }

    /// Path the next [`save`](Self::save) writes to
    pub fn path(&self) -> Option<PathBuf> {
        self.path.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Assign the save target without loading anything from it
    pub fn set_path(&self, path: impl Into<PathBuf>) {
        *self.path.lock().unwrap_or_else(PoisonError::into_inner) = Some(path.into());
    }

    fn document(&self) -> MutexGuard<'_, Document<R>> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace one entry, returning the previous record
    pub fn insert(&self, domain: &str, name: &str, record: R) -> Option<R> {
        self.document()
            .entry(domain.to_string())
            .or_default()
            .insert(name.to_string(), record)
    }

    /// Remove one entry; a domain left empty is dropped as well
    pub fn remove(&self, domain: &str, name: &str) -> Option<R> {
        let mut doc = self.document();
        let entries = doc.get_mut(domain)?;
        let removed = entries.remove(name);
        if entries.is_empty() {
            doc.remove(domain);
        }
        removed
    }

    /// Sorted list of domains holding at least one entry
    pub fn domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self
            .document()
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(domain, _)| domain.clone())
            .collect();
        domains.sort();
        domains
    }

    /// Total number of entries across all domains
    pub fn len(&self) -> usize {
        self.document().values().map(|entries| entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overlay `theirs` onto the jar, `theirs` winning per entry
    pub fn merge_from(&self, theirs: Document<R>) -> usize {
        merge_document(&mut *self.document(), theirs)
    }
}

impl<R: Clone> Store<R> {
    pub fn get(&self, domain: &str, name: &str) -> Option<R> {
        self.document().get(domain)?.get(name).cloned()
    }

    /// Copy of the whole document
    pub fn snapshot(&self) -> Document<R> {
        self.document().clone()
    }
}

impl<R> Store<R>
where
    R: Serialize + DeserializeOwned,
{
    /// New store loaded from `path` (missing file = empty jar)
    pub fn open(path: impl AsRef<Path>, options: PersistOptions) -> Result<Self, JarError> {
        let store = Self::with_options(options);
        store.load(path)?;
        Ok(store)
    }

    /// Replace the jar with the document at `path` and remember `path`
    ///
    /// A missing file loads as an empty jar and still records the path, so
    /// the first save creates it. On a decode error nothing changes.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(), JarError> {
        let path = path.as_ref();
        let loaded = load_document(path)?;
        let entries: usize = loaded.values().map(|e| e.len()).sum();
        *self.document() = loaded;
        self.set_path(path);
        debug!(path = %path.display(), entries, "loaded jar");
        Ok(())
    }

    /// Encode the jar and write it to `writer`
    ///
    /// The document lock covers encoding only; `writer` is called after the
    /// lock is released.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), JarError> {
        let origin = Path::new(STREAM_ORIGIN);
        let content = self.encode_snapshot(origin)?;
        writer.write_all(&content).map_err(|e| JarError::io(origin, e))
    }

    /// Replace the jar with a document decoded from `reader`
    ///
    /// The lock is only taken once decoding has succeeded, so a malformed
    /// stream leaves the jar as it was.
    pub fn read_from<Rd: Read + ?Sized>(&self, reader: &mut Rd) -> Result<(), JarError> {
        let decoded = decode_document(reader, Path::new(STREAM_ORIGIN))?;
        *self.document() = decoded;
        Ok(())
    }

    fn encode_snapshot(&self, origin: &Path) -> Result<Vec<u8>, JarError> {
        let doc = self.document();
        encode_to_vec(&*doc, self.options.format, origin)
    }

    /// Atomically write the jar to its remembered path
    ///
    /// Losing a race against another writer is not an error: their entries
    /// are merged in (theirs win) and the save is retried with a fresh
    /// pending write. Any other failure is returned after the staging file
    /// has been removed.
    ///
    /// # Errors
    ///
    /// - [`JarError::NotLoaded`] if no path was ever loaded or set
    /// - [`JarError::Io`] / [`JarError::Json`] for fatal write failures
    /// - [`JarError::RetryLimit`] if [`PersistOptions::max_attempts`] runs out
    pub fn save(&self) -> Result<SaveOutcome, JarError> {
        self.save_with(|_| {})
    }

    /// [`save`](Self::save) with a callback run between serialization and
    /// commit on every attempt
    pub(crate) fn save_with<F>(&self, mut before_commit: F) -> Result<SaveOutcome, JarError>
    where
        F: FnMut(&AtomicFile),
    {
        let path = self.path().ok_or(JarError::NotLoaded)?;
        let mut attempts = 0u32;
        let mut retries = 0u32;
        let mut merged_entries = 0usize;

        loop {
            self.check_budget(&path, attempts)?;
            attempts += 1;

            let mut pending = AtomicFile::open(&path)?;
            let content = match self.encode_snapshot(&path) {
                Ok(content) => content,
                Err(e) => {
                    let _ = pending.cancel();
                    return Err(e);
                }
            };
            if let Err(e) = pending.write_all(&content) {
                let _ = pending.cancel();
                return Err(JarError::io(pending.temp_path(), e));
            }

            before_commit(&pending);

            match pending.commit() {
                Ok(()) => {
                    debug!(path = %path.display(), attempts, "saved jar");
                    return Ok(if retries == 0 {
                        SaveOutcome::Clean
                    } else {
                        SaveOutcome::Merged {
                            retries,
                            merged_entries,
                        }
                    });
                }
                Err(e) if e.is_conflict() => {
                    retries += 1;
                    warn!(path = %path.display(), attempt = attempts, "jar changed on disk, merging before retry");
                }
                Err(e) => {
                    let _ = pending.cancel();
                    return Err(e);
                }
            }

            let theirs = self.reload_for_merge(&path, &mut attempts)?;
            let copied = self.merge_from(theirs);
            merged_entries += copied;
            info!(path = %path.display(), copied, "merged newer on-disk entries");
        }
    }

    /// Re-read the winner's document, retrying until it decodes
    fn reload_for_merge(&self, path: &Path, attempts: &mut u32) -> Result<Document<R>, JarError> {
        let mut failures = 0u32;
        loop {
            match load_document(path) {
                Ok(doc) => return Ok(doc),
                Err(e) => {
                    failures += 1;
                    warn!(path = %path.display(), failures, error = %e, "reload for merge failed, retrying");
                    self.check_budget(path, *attempts)?;
                    *attempts += 1;
                    std::thread::sleep(self.backoff(failures));
                }
            }
        }
    }

    fn check_budget(&self, path: &Path, attempts: u32) -> Result<(), JarError> {
        match self.options.max_attempts {
            Some(max) if max > 0 && attempts >= max => Err(JarError::RetryLimit {
                path: path.to_path_buf(),
                attempts,
            }),
            _ => Ok(()),
        }
    }

    fn backoff(&self, failures: u32) -> Duration {
        let shift = failures.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
        self.options.reload_backoff.saturating_mul(1 << shift)
    }
}
