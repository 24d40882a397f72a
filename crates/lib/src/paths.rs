use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathsError {
  #[error("HOME is not set; cannot resolve the user home directory")]
  HomeNotSet,
}

/// Returns the user's home directory
pub fn home_dir() -> Result<PathBuf, PathsError> {
  std::env::var_os("HOME")
    .filter(|v| !v.is_empty())
    .map(PathBuf::from)
    .ok_or(PathsError::HomeNotSet)
}

/// Returns the base directory for user configuration files
pub fn config_dir() -> Result<PathBuf, PathsError> {
  match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
    Some(dir) => Ok(PathBuf::from(dir)),
    None => Ok(home_dir()?.join(".config")),
  }
}

/// Returns the directory scanned by desktop environments for login auto-start entries
pub fn autostart_dir() -> Result<PathBuf, PathsError> {
  Ok(config_dir()?.join("autostart"))
}
