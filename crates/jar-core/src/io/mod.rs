//! Crash-safe, conflict-aware persistence for jar documents
//!
//! Key pieces:
//!
//! - **Atomic replace**: new contents are staged in a temp file beside the
//!   target and renamed over it, so readers never see a torn file
//! - **Conflict detection**: a target modified after the write began is
//!   reported instead of overwritten
//! - **Merge and retry**: [`Store::save`] folds the newer on-disk entries
//!   into memory (disk wins per entry) and tries again
//! - **Round-trip preservation**: records are opaque; unknown fields survive
//!
//! There is no file locking. See [`atomic`] for the races this accepts.
//!
//! # Example
//!
//! ```rust,no_run
//! use cookiejar_core::io::{PersistOptions, SaveOutcome, Store};
//! use cookiejar_core::Cookie;
//!
//! let jar: Store<Cookie> = Store::open("/home/user/.cookiejar/cookies.json", PersistOptions::default()).unwrap();
//! jar.insert("example.com", "sid", Cookie::new("example.com", "sid", "abc123"));
//!
//! match jar.save().unwrap() {
//!     SaveOutcome::Clean => println!("saved"),
//!     SaveOutcome::Merged { merged_entries, .. } => {
//!         println!("saved after merging {merged_entries} newer entries")
//!     }
//! }
//! ```

pub mod atomic;
pub mod document;
pub mod error;
pub mod store;

// Re-export primary API
pub use atomic::AtomicFile;
pub use document::{Document, DocumentFormat};
pub use error::JarError;
pub use store::{PersistOptions, SaveOutcome, Store};
