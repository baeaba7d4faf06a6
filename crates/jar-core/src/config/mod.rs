//! Configuration resolution
//!
//! Resolves configuration from multiple sources with priority:
//! 1. Command-line flags (passed as parameters)
//! 2. Environment variables
//! 3. Repo-local config (.cookiejar.toml)
//! 4. Global config (~/.config/cookiejar/config.toml)
//! 5. Defaults

mod discovery;
mod types;

pub use discovery::{resolve_config, ConfigError, ConfigOverrides};
pub use types::{Config, CoreConfig, PersistConfig};
