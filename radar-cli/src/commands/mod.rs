pub mod config;
pub mod run;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use radar_core::{config as radar_config, Config};
use radar_store::JsonFileStore;

/// The explicit `--config` path, or `~/.octoradar/config.yaml`.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => {
            let home = dirs::home_dir().context("could not determine home directory")?;
            Ok(radar_config::config_path_at(&home))
        }
    }
}

pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = config_path(explicit)?;
    radar_config::load_from(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

pub fn open_store(config: &Config) -> Result<JsonFileStore> {
    let path = config
        .store
        .resolved_path()
        .context("could not resolve the store path")?;
    JsonFileStore::open(&path).with_context(|| format!("failed to open store at {}", path.display()))
}
