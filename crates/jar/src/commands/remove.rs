//! Remove command implementation

use anyhow::{bail, Result};
use clap::Args;

use super::{open_jar, save_jar, GlobalArgs};

/// Delete a cookie
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Cookie domain
    domain: String,

    /// Cookie name
    name: String,
}

/// Execute the remove command
pub fn execute(global: &GlobalArgs, args: RemoveArgs) -> Result<()> {
    let store = open_jar(global)?;

    if store.remove(&args.domain, &args.name).is_none() {
        bail!("No cookie '{}' for domain '{}'", args.name, args.domain);
    }

    save_jar(&store)?;
    println!("Removed {} from {}", args.name, args.domain);
    Ok(())
}
