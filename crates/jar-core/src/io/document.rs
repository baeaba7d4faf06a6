//! Encoding and decoding of whole jar documents
//!
//! A document is the full `domain -> name -> record` mapping. It is always
//! read and written in one piece as a single JSON object.

use crate::io::error::JarError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Two-level mapping persisted as one unit
pub type Document<R> = HashMap<String, HashMap<String, R>>;

/// Layout of the encoded document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Single line
    #[default]
    Compact,
    /// Indented, for files people read by hand
    Pretty,
}

/// Encode `doc` as one JSON object followed by a newline
///
/// `origin` only labels errors.
pub fn encode_to_vec<R>(
    doc: &Document<R>,
    format: DocumentFormat,
    origin: &Path,
) -> Result<Vec<u8>, JarError>
where
    R: Serialize,
{
    let mut content = match format {
        DocumentFormat::Compact => serde_json::to_vec(doc),
        DocumentFormat::Pretty => serde_json::to_vec_pretty(doc),
    }
    .map_err(|e| JarError::json(origin, e))?;
    content.push(b'\n');
    Ok(content)
}

/// Encode `doc` and write it to `writer`
///
/// Encoding failures are [`JarError::Json`]; a failing writer is
/// [`JarError::Io`].
pub fn encode_document<W, R>(
    writer: &mut W,
    doc: &Document<R>,
    format: DocumentFormat,
    origin: &Path,
) -> Result<(), JarError>
where
    W: Write + ?Sized,
    R: Serialize,
{
    let content = encode_to_vec(doc, format, origin)?;
    writer
        .write_all(&content)
        .map_err(|e| JarError::io(origin, e))
}

/// Decode a full document from `reader`
///
/// Empty input and a JSON `null` both decode to an empty document, so a
/// zero-length file behaves like a missing one.
pub fn decode_document<Rd, R>(reader: &mut Rd, origin: &Path) -> Result<Document<R>, JarError>
where
    Rd: Read + ?Sized,
    R: DeserializeOwned,
{
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .map_err(|e| JarError::io(origin, e))?;
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::new());
    }
    let doc: Option<Document<R>> =
        serde_json::from_slice(&content).map_err(|e| JarError::json(origin, e))?;
    Ok(doc.unwrap_or_default())
}

/// Read the document stored at `path`; a missing file is an empty document
pub fn load_document<R>(path: &Path) -> Result<Document<R>, JarError>
where
    R: DeserializeOwned,
{
    let mut file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Document::new()),
        Err(e) => return Err(JarError::io(path, e)),
    };
    decode_document(&mut file, path)
}

/// Overlay `theirs` onto `ours`, `theirs` winning for every inner key
///
/// Keys present only in `ours` are kept. Returns the number of entries
/// copied from `theirs`.
pub fn merge_document<R>(ours: &mut Document<R>, theirs: Document<R>) -> usize {
    let mut copied = 0;
    for (domain, entries) in theirs {
        let slot = ours.entry(domain).or_default();
        copied += entries.len();
        slot.extend(entries);
    }
    copied
}
