//! Utility functions for path handling.

use std::path::{Path, PathBuf};

use anyhow::anyhow;

/// Location of the configuration file, relative to the home directory.
const CONFIG_PATH: [&str; 3] = [".config", "matrix-send", "config.ini"];

/// Returns the default configuration file path,
/// `$HOME/.config/matrix-send/config.ini`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(config_path_in(&home))
}

fn config_path_in(home: &Path) -> PathBuf {
    CONFIG_PATH.iter().fold(home.to_path_buf(), |path, component| path.join(component))
}
