//! Set command implementation

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use cookiejar_core::Cookie;

use super::{open_jar, save_jar, GlobalArgs};

/// Add or replace a cookie
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Cookie domain
    domain: String,

    /// Cookie name
    name: String,

    /// Cookie value
    value: String,

    /// Cookie path
    #[arg(long, default_value = "/")]
    path: String,

    /// Only send over HTTPS
    #[arg(long)]
    secure: bool,

    /// Hide from scripts
    #[arg(long)]
    http_only: bool,

    /// Expiry (RFC 3339); makes the cookie persistent
    #[arg(long)]
    expires: Option<String>,
}

/// Execute the set command
pub fn execute(global: &GlobalArgs, args: SetArgs) -> Result<()> {
    let expires = args
        .expires
        .as_deref()
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .with_context(|| format!("Invalid --expires '{raw}' (expected RFC 3339)"))
        })
        .transpose()?;

    let store = open_jar(global)?;

    let mut cookie = Cookie::new(&args.domain, &args.name, &args.value);
    if let Some(existing) = store.get(&args.domain, &args.name) {
        cookie.creation = existing.creation;
        cookie.unknown_fields = existing.unknown_fields;
    }
    cookie.path = args.path;
    cookie.secure = args.secure;
    cookie.http_only = args.http_only;
    if let Some(expires) = expires {
        cookie.expires = expires;
        cookie.persistent = true;
    }

    store.insert(&args.domain, &args.name, cookie);
    save_jar(&store)?;
    println!("Set {} on {}", args.name, args.domain);
    Ok(())
}
