//! Home directory resolution
//!
//! # Precedence
//!
//! 1. `COOKIEJAR_HOME` environment variable (if set and non-empty)
//! 2. `dirs::home_dir()` platform default
//!
//! Integration tests set `COOKIEJAR_HOME` to a temp dir so nothing touches
//! the real home directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Get the home directory for cookiejar files
///
/// # Errors
///
/// Returns an error if `COOKIEJAR_HOME` is unset and the platform home
/// directory cannot be determined.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("COOKIEJAR_HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::home_dir().context("Could not determine home directory")
}

/// Jar file used when neither config nor flags name one
pub fn default_jar_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".cookiejar").join("cookies.json")
}
