//! Path command implementation

use anyhow::Result;
use cookiejar_core::config::{resolve_config, ConfigOverrides};
use cookiejar_core::home::get_home_dir;

use super::GlobalArgs;

/// Execute the path command
///
/// Resolves without touching the jar file, so it works before the first save.
pub fn execute(global: &GlobalArgs) -> Result<()> {
    let home_dir = get_home_dir()?;
    let current_dir = std::env::current_dir()?;
    let overrides = ConfigOverrides {
        jar_path: global.jar.clone(),
        config_path: global.config.clone(),
        ..Default::default()
    };

    let config = resolve_config(&overrides, &current_dir, &home_dir)?;
    println!("{}", config.jar_path(&home_dir).display());
    Ok(())
}
