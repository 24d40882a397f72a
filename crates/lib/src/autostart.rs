//! Desktop auto-start entry written to the freedesktop autostart directory.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::paths::{self, PathsError};

#[derive(Debug, Error)]
pub enum AutostartError {
  #[error(transparent)]
  Paths(#[from] PathsError),

  #[error("failed to create {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: std::io::Error },
}

/// Render the `.desktop` entry launched at login.
pub fn desktop_entry(name: &str, description: &str, exec: &str) -> String {
  format!(
    "#!/usr/bin/env xdg-open\n\
     [Desktop Entry]\n\
     Type=Application\n\
     Name={name}\n\
     Description={description}\n\
     Exec={exec}\n"
  )
}

/// Install `<autostart dir>/<name>.desktop`, overwriting any previous entry.
///
/// Returns the path written.
pub fn install_autostart(name: &str, description: &str, exec: &str) -> Result<PathBuf, AutostartError> {
  let dir = paths::autostart_dir()?;
  fs::create_dir_all(&dir).map_err(|e| AutostartError::CreateDir {
    path: dir.clone(),
    source: e,
  })?;

  let path = dir.join(format!("{name}.desktop"));
  fs::write(&path, desktop_entry(name, description, exec)).map_err(|e| AutostartError::Write {
    path: path.clone(),
    source: e,
  })?;

  info!(path = %path.display(), "installed auto-start entry");
  Ok(path)
}
