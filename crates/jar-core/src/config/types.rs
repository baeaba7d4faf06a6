//! Configuration types

use crate::io::{DocumentFormat, PersistOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Core configuration
    #[serde(default)]
    pub core: CoreConfig,
    /// Save behaviour
    #[serde(default)]
    pub persist: PersistConfig,
}

/// Core configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Jar file; `~/.cookiejar/cookies.json` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jar_path: Option<PathBuf>,
}

/// Save behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistConfig {
    /// Attempt budget per save; unset means retry until it lands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Write indented JSON
    #[serde(default)]
    pub pretty: bool,
    /// Base delay before re-reading a file that failed to decode
    #[serde(default = "default_reload_backoff_ms")]
    pub reload_backoff_ms: u64,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            pretty: false,
            reload_backoff_ms: default_reload_backoff_ms(),
        }
    }
}

fn default_reload_backoff_ms() -> u64 {
    50
}

impl Config {
    /// Jar path from config, falling back to the default under `home_dir`
    pub fn jar_path(&self, home_dir: &Path) -> PathBuf {
        self.core
            .jar_path
            .clone()
            .unwrap_or_else(|| crate::home::default_jar_path(home_dir))
    }

    /// Options for [`Store`](crate::io::Store) built from `[persist]`
    pub fn persist_options(&self) -> PersistOptions {
        PersistOptions {
            max_attempts: self.persist.max_attempts,
            format: if self.persist.pretty {
                DocumentFormat::Pretty
            } else {
                DocumentFormat::Compact
            },
            reload_backoff: Duration::from_millis(self.persist.reload_backoff_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_map_to_default_options() {
        let config = Config::default();
        assert_eq!(config.persist_options(), PersistOptions::default());
        assert_eq!(
            config.jar_path(Path::new("/h")),
            PathBuf::from("/h/.cookiejar/cookies.json")
        );
    }

    #[test]
    fn test_persist_section_parses() {
        let config: Config = toml::from_str(
            r#"
[core]
jar_path = "/var/lib/jar.json"

[persist]
max_attempts = 10
pretty = true
            "#,
        )
        .unwrap();

        assert_eq!(config.jar_path(Path::new("/h")), PathBuf::from("/var/lib/jar.json"));
        let options = config.persist_options();
        assert_eq!(options.max_attempts, Some(10));
        assert_eq!(options.format, DocumentFormat::Pretty);
        assert_eq!(options.reload_backoff, Duration::from_millis(50));
    }
}
