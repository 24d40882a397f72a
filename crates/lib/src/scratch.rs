//! Scratch directory holding compiled artifacts for one deployment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

/// Name of the scratch directory created under the project root.
pub const SCRATCH_DIR_NAME: &str = ".compiled";

#[derive(Debug, Error)]
pub enum ScratchError {
  #[error(
    "scratch directory already exists: {}\n\
     Another deployment may be running on this project. If not, remove the directory and retry.",
    path.display()
  )]
  AlreadyExists { path: PathBuf },

  #[error("failed to create scratch directory {}: {source}", path.display())]
  Create { path: PathBuf, source: std::io::Error },
}

/// Guard over `<root>/.compiled` for the duration of one deployment.
///
/// Creation refuses to reuse an existing directory, which doubles as the
/// marker against overlapping runs on the same project. Dropping the guard
/// removes the whole tree, so compiled artifacts never outlive the run that
/// produced them, whether it returned, failed, or panicked.
pub struct ScratchDir {
  path: PathBuf,
}

impl ScratchDir {
  pub fn create(root: &Path) -> Result<Self, ScratchError> {
    let path = root.join(SCRATCH_DIR_NAME);
    match fs::create_dir(&path) {
      Ok(()) => Ok(ScratchDir { path }),
      Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(ScratchError::AlreadyExists { path }),
      Err(e) => Err(ScratchError::Create { path, source: e }),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl Drop for ScratchDir {
  fn drop(&mut self) {
    if let Err(e) = fs::remove_dir_all(&self.path) {
      warn!(path = %self.path.display(), error = %e, "failed to remove scratch directory");
    }
  }
}
