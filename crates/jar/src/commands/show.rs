//! Show command implementation

use anyhow::Result;
use clap::Args;
use cookiejar_core::Cookie;
use std::collections::BTreeMap;

use super::{open_jar, GlobalArgs};

/// List cookies in the jar
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Only show cookies for this domain
    #[arg(long)]
    domain: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the show command
pub fn execute(global: &GlobalArgs, args: ShowArgs) -> Result<()> {
    let store = open_jar(global)?;

    // Sorted so output is stable across runs
    let mut listing: BTreeMap<String, BTreeMap<String, Cookie>> = store
        .snapshot()
        .into_iter()
        .map(|(domain, entries)| (domain, entries.into_iter().collect()))
        .collect();
    if let Some(ref domain) = args.domain {
        listing.retain(|d, _| d == domain);
    }
    listing.retain(|_, entries| !entries.is_empty());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if listing.is_empty() {
        println!("No cookies");
        return Ok(());
    }

    for (domain, entries) in &listing {
        println!("{domain}");
        for (name, cookie) in entries {
            println!("  {}", format_cookie(name, cookie));
        }
    }
    Ok(())
}

fn format_cookie(name: &str, cookie: &Cookie) -> String {
    let mut line = format!("{name}={} path={}", cookie.value, cookie.path);
    if cookie.persistent {
        line.push_str(&format!(" expires={}", cookie.expires.to_rfc3339()));
    }
    if cookie.secure {
        line.push_str(" secure");
    }
    if cookie.http_only {
        line.push_str(" httponly");
    }
    line
}
