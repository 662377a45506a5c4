use std::path::Path;

use dockhand_core::DeployConfig;

/// Load the configuration and echo it back, pretty-printed.
pub fn config() -> anyhow::Result<()> {
    let config = DeployConfig::load(Path::new("."))?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
