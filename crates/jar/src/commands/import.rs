//! Import command implementation

use anyhow::{bail, Result};
use clap::Args;
use cookiejar_core::io::document::load_document;
use cookiejar_core::Cookie;
use std::path::PathBuf;

use super::{open_jar, save_jar, GlobalArgs};

/// Merge another jar file into this one
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Jar file to read entries from
    file: PathBuf,
}

/// Execute the import command
pub fn execute(global: &GlobalArgs, args: ImportArgs) -> Result<()> {
    if !args.file.exists() {
        bail!("File not found: {}", args.file.display());
    }
    let incoming = load_document::<Cookie>(&args.file)?;

    let store = open_jar(global)?;
    let copied = store.merge_from(incoming);
    save_jar(&store)?;

    println!("Imported {copied} cookies from {}", args.file.display());
    Ok(())
}
