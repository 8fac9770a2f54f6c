//! CLI subcommands.

pub mod config;
pub mod extract;
pub mod inspect;

use std::path::{Path, PathBuf};

use tracing::debug;

use ebill_core::{EbillConfig, EbillError};

/// `<config dir>/ebill/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ebill")
        .join("config.json")
}

/// Explicit path, else the default file if present, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<EbillConfig, EbillError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = default_config_path();
            if !default.exists() {
                return Ok(EbillConfig::default());
            }
            default
        }
    };

    debug!("Loading configuration from {}", path.display());
    EbillConfig::from_file(&path)
        .map_err(|e| EbillError::Config(format!("{}: {}", path.display(), e)))
}
