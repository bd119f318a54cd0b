//! Subcommands.

pub mod batch;
pub mod config;
pub mod parse;

use std::path::{Path, PathBuf};

use tracing::debug;

use stmt_core::StmtConfig;

/// `<config dir>/stmt/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stmt")
        .join("config.json")
}

/// Load the config given with `--config`, else the user config file if it
/// exists, else the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<StmtConfig> {
    if let Some(path) = config_path {
        return Ok(StmtConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config file {}", path.display());
        Ok(StmtConfig::from_file(&path)?)
    } else {
        Ok(StmtConfig::default())
    }
}
