//! CLI command dispatch and execution

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cookiejar_core::config::{resolve_config, ConfigOverrides};
use cookiejar_core::home::get_home_dir;
use cookiejar_core::{Cookie, SaveOutcome, Store};
use std::path::PathBuf;

mod import;
mod path;
mod remove;
mod set;
mod show;

/// jar - inspect and edit a persistent cookie jar file
#[derive(Parser, Debug)]
#[command(
    name = "jar",
    version,
    about = "Inspect and edit a persistent cookie jar file",
    long_about = "Reads and writes a JSON cookie jar with atomic, conflict-merging saves"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Jar file (default: ~/.cookiejar/cookies.json)
    #[arg(long, global = true)]
    jar: Option<PathBuf>,

    /// Config file to use instead of the repo-local .cookiejar.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write indented JSON
    #[arg(long, global = true)]
    pretty: bool,

    /// Give up after this many save attempts (0 = never)
    #[arg(long, global = true)]
    max_attempts: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List cookies in the jar
    Show(show::ShowArgs),

    /// Add or replace a cookie
    Set(set::SetArgs),

    /// Delete a cookie
    Remove(remove::RemoveArgs),

    /// Merge another jar file into this one (its entries win)
    Import(import::ImportArgs),

    /// Print the resolved jar path
    Path,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Show(args) => show::execute(&self.global, args),
            Commands::Set(args) => set::execute(&self.global, args),
            Commands::Remove(args) => remove::execute(&self.global, args),
            Commands::Import(args) => import::execute(&self.global, args),
            Commands::Path => path::execute(&self.global),
        }
    }
}

/// Resolve the jar path and open it
pub(crate) fn open_jar(global: &GlobalArgs) -> Result<Store<Cookie>> {
    let home_dir = get_home_dir()?;
    let current_dir = std::env::current_dir()?;

    let overrides = ConfigOverrides {
        jar_path: global.jar.clone(),
        max_attempts: global.max_attempts,
        pretty: global.pretty.then_some(true),
        config_path: global.config.clone(),
    };
    let config = resolve_config(&overrides, &current_dir, &home_dir)?;
    let jar_path = config.jar_path(&home_dir);

    let store = Store::open(&jar_path, config.persist_options())
        .with_context(|| format!("Failed to load jar {}", jar_path.display()))?;
    Ok(store)
}

/// Save the jar, creating its directory on first use, and report merges
pub(crate) fn save_jar(store: &Store<Cookie>) -> Result<()> {
    let path = store.path().context("Jar has no path")?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    match store.save()? {
        SaveOutcome::Clean => {
            tracing::debug!(path = %path.display(), "jar saved");
        }
        SaveOutcome::Merged { merged_entries, .. } => {
            println!(
                "Merged {merged_entries} entries written concurrently to {}",
                path.display()
            );
        }
    }
    Ok(())
}
