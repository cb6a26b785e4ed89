//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use tracing::debug;

use recu_core::RecuConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recu")
        .join("config.json")
}

/// Configuration file selected by the global `--config` flag, or the default one.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path.map_or_else(default_config_path, PathBuf::from)
}

/// Load the configuration used by the extraction commands.
///
/// An explicit `--config` file must exist. The default file is optional and
/// the built-in defaults apply without it.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RecuConfig> {
    if let Some(path) = config_path {
        let path = Path::new(path);
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        debug!("Loading configuration from {}", path.display());
        return Ok(RecuConfig::from_file(path)?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(RecuConfig::from_file(&path)?)
    } else {
        Ok(RecuConfig::default())
    }
}
