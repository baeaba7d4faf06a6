//! jar - inspect and edit a persistent cookie jar file
//!
//! A thin CLI over `cookiejar-core`: every mutating command loads the jar,
//! applies one change and saves it back with conflict-aware merging.

use clap::Parser;

mod commands;

use commands::Cli;

fn main() {
    cookiejar_core::logging::init();
    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
