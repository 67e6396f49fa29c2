//! Configuration module
//!
//! Loads the device endpoint, trace switches and the command-name table

mod settings;

pub use settings::{AppConfig, ConfigError, ConfigSource};

use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable naming the config file
pub const CONFIG_ENV_VARIABLE: &str = "config_file";

/// Default config file name
pub const DEFAULT_FILENAME: &str = "config.toml";

/// Get the application configuration directory
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "avlink", "Avlink").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(DEFAULT_FILENAME))
}
