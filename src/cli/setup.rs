use crate::core::config::AppConfig;
use anyhow::{Context, Result, bail};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::info;

const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Writes the example configuration to the default config location.
pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    write_example_config(&path)?;
    println!("Created configuration at {}", path.display());
    println!("Edit the input paths there, or pass --sales/--financial/--evaluation.");
    Ok(())
}

/// Writes the example configuration to `path`. An existing file is never
/// overwritten.
pub fn write_example_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!("Configuration file already exists at {}", path.display())
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to create config file: {}", path.display()));
        }
    };
    file.write_all(EXAMPLE_CONFIG.as_bytes())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    info!("Wrote example configuration to {}", path.display());
    Ok(())
}
