//! Record types stored in a jar document
//!
//! The persister treats records as opaque; these are the shapes the jar
//! CLI and collaborators exchange. All types preserve unknown fields.

mod cookie;

pub use cookie::Cookie;
