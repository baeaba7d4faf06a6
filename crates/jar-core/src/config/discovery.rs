//! Configuration discovery and resolution

use super::types::Config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Name of the repo-local config file
const REPO_CONFIG_FILE: &str = ".cookiejar.toml";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("TOML parsing error in {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Command-line overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Override jar file
    pub jar_path: Option<PathBuf>,
    /// Override save attempt budget
    pub max_attempts: Option<u32>,
    /// Force indented output
    pub pretty: Option<bool>,
    /// Explicit config file, used instead of the repo-local search
    pub config_path: Option<PathBuf>,
}

/// One config file as written; every field optional so layers only
/// override what they mention.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    core: FileCore,
    #[serde(default)]
    persist: FilePersist,
}

#[derive(Debug, Default, Deserialize)]
struct FileCore {
    jar_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct FilePersist {
    max_attempts: Option<u32>,
    pretty: Option<bool>,
    reload_backoff_ms: Option<u64>,
}

/// Resolve configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides
/// 2. Environment variables
/// 3. Repo-local config (.cookiejar.toml in current dir or up to git root),
///    or the explicit `config_path` override
/// 4. Global config (~/.config/cookiejar/config.toml)
/// 5. Defaults
///
/// Unreadable discovered files are skipped with a warning; an unreadable
/// explicit `config_path` is an error.
pub fn resolve_config(
    overrides: &ConfigOverrides,
    current_dir: &Path,
    home_dir: &Path,
) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    // 4. Try global config
    let global_config_path = home_dir.join(".config/cookiejar/config.toml");
    if global_config_path.exists() {
        match load_config_file(&global_config_path) {
            Ok(file_config) => merge_config(&mut config, file_config, &global_config_path),
            Err(e) => warn!("Skipping global config: {e}"),
        }
    }

    // 3. Explicit config file, else repo-local search
    if let Some(ref explicit) = overrides.config_path {
        let file_config = load_config_file(explicit)?;
        merge_config(&mut config, file_config, explicit);
    } else if let Some(repo_config) = find_repo_local_config(current_dir) {
        match load_config_file(&repo_config) {
            Ok(file_config) => merge_config(&mut config, file_config, &repo_config),
            Err(e) => warn!("Skipping repo config: {e}"),
        }
    }

    // 2. Apply environment variables
    apply_env_overrides(&mut config);

    // 1. Apply command-line overrides
    apply_cli_overrides(&mut config, overrides);

    Ok(config)
}

/// Find repo-local config file
///
/// Searches current directory and parent directories up to git root
fn find_repo_local_config(current_dir: &Path) -> Option<PathBuf> {
    let mut dir = current_dir;

    loop {
        let config_path = dir.join(REPO_CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        // Stop at git root
        if dir.join(".git").exists() {
            break;
        }

        dir = dir.parent()?;
    }

    None
}

/// Load config from a TOML file
fn load_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge one file layer into the base config
///
/// A relative `jar_path` is taken relative to the file that names it.
fn merge_config(base: &mut Config, file: FileConfig, file_path: &Path) {
    if let Some(jar_path) = file.core.jar_path {
        base.core.jar_path = Some(match file_path.parent() {
            Some(dir) if jar_path.is_relative() => dir.join(jar_path),
            _ => jar_path,
        });
    }

    if file.persist.max_attempts.is_some() {
        base.persist.max_attempts = file.persist.max_attempts;
    }
    if let Some(pretty) = file.persist.pretty {
        base.persist.pretty = pretty;
    }
    if let Some(backoff) = file.persist.reload_backoff_ms {
        base.persist.reload_backoff_ms = backoff;
    }
}

/// Apply environment variable overrides
fn apply_env_overrides(config: &mut Config) {
    if let Ok(path) = std::env::var("COOKIEJAR_PATH")
        && !path.trim().is_empty()
    {
        config.core.jar_path = Some(PathBuf::from(path.trim()));
    }

    if let Ok(raw) = std::env::var("COOKIEJAR_MAX_ATTEMPTS") {
        match raw.trim().parse::<u32>() {
            Ok(0) => config.persist.max_attempts = None,
            Ok(max) => config.persist.max_attempts = Some(max),
            Err(_) => warn!("Ignoring invalid COOKIEJAR_MAX_ATTEMPTS={raw:?}"),
        }
    }

    if let Ok(raw) = std::env::var("COOKIEJAR_PRETTY") {
        config.persist.pretty = matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }
}

/// Apply command-line overrides
fn apply_cli_overrides(config: &mut Config, overrides: &ConfigOverrides) {
    if let Some(ref jar_path) = overrides.jar_path {
        config.core.jar_path = Some(jar_path.clone());
    }

    if let Some(max) = overrides.max_attempts {
        config.persist.max_attempts = if max == 0 { None } else { Some(max) };
    }

    if let Some(pretty) = overrides.pretty {
        config.persist.pretty = pretty;
    }
}
