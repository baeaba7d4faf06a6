//! Core library for cookiejar: a crash-safe, conflict-aware on-disk jar
//!
//! The jar is a `domain -> name -> record` mapping held in memory and
//! persisted as one JSON document. Saves go through a temp file and an
//! atomic rename; independent processes that load, modify and save the same
//! file merge each other's newer entries instead of clobbering them.

pub mod config;
pub mod home;
pub mod io;
pub mod logging;
pub mod schema;

pub use io::{Document, JarError, PersistOptions, SaveOutcome, Store};
pub use schema::Cookie;
