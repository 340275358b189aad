//! Platform-specific configuration and data paths.

use crate::constants::{APP_NAME, DEFAULT_STORE_FILE};
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the configuration directory for the current platform.
///
/// - Linux: `~/.config/birdtag/`
/// - macOS: `~/Library/Application Support/birdtag/`
/// - Windows: `%APPDATA%\birdtag\`
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the default record store path in the platform data directory.
pub fn default_store_path() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().join(DEFAULT_STORE_FILE))
        .ok_or(Error::ConfigDirNotFound)
}
