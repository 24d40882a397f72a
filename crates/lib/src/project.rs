//! Project model: a configured root directory and its deployable sources.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

use crate::config::{ConfigError, ProjectConfig};

#[derive(Debug, Error)]
pub enum ProjectError {
  #[error("cannot resolve project root {}: {source}", path.display())]
  BadRoot { path: PathBuf, source: std::io::Error },

  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("failed to walk {}: {source}", dir.display())]
  Walk { dir: PathBuf, source: walkdir::Error },
}

/// A MicroPython project: canonicalized root plus its configuration.
#[derive(Debug, Clone)]
pub struct Project {
  root: PathBuf,
  config: ProjectConfig,
}

impl Project {
  /// Load the project rooted at `root`.
  pub fn load(root: &Path) -> Result<Self, ProjectError> {
    let root = dunce::canonicalize(root).map_err(|e| ProjectError::BadRoot {
      path: root.to_path_buf(),
      source: e,
    })?;
    let config = ProjectConfig::load(&root)?;
    Ok(Project { root, config })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn config(&self) -> &ProjectConfig {
    &self.config
  }

  /// All `.py` files under the configured source directories, as paths
  /// relative to the project root, sorted lexicographically.
  ///
  /// This ordering is load-bearing: manifest entries, the device's reply
  /// flags, and the transfer loop pair up positionally, and they all derive
  /// their order from this one list.
  pub fn source_files(&self) -> Result<Vec<PathBuf>, ProjectError> {
    let mut files = Vec::new();

    for source in &self.config.sources {
      let dir = self.root.join(source);
      if !dir.is_dir() {
        warn!(dir = %dir.display(), "source directory missing, skipping");
        continue;
      }

      for entry in WalkDir::new(&dir) {
        let entry = entry.map_err(|e| ProjectError::Walk {
          dir: dir.clone(),
          source: e,
        })?;
        if !entry.file_type().is_file() {
          continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("py") {
          continue;
        }
        let rel = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
        files.push(rel.to_path_buf());
      }
    }

    files.sort();
    files.dedup();
    Ok(files)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::tempdir;

  fn scaffold(sources: &str) -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    fs::write(
      temp.path().join("mpysync.toml"),
      format!("[project]\nname = \"glove\"\nsources = {sources}\n"),
    )
    .unwrap();
    temp
  }

  #[test]
  fn discovers_sorted_relative_paths() {
    let temp = scaffold("[\"micropython\", \"common\"]");
    fs::create_dir_all(temp.path().join("micropython/drivers")).unwrap();
    fs::create_dir_all(temp.path().join("common")).unwrap();
    fs::write(temp.path().join("micropython/main_loop.py"), "").unwrap();
    fs::write(temp.path().join("micropython/drivers/imu.py"), "").unwrap();
    fs::write(temp.path().join("common/packets.py"), "").unwrap();

    let project = Project::load(temp.path()).unwrap();
    let files = project.source_files().unwrap();

    assert_eq!(
      files,
      vec![
        PathBuf::from("common/packets.py"),
        PathBuf::from("micropython/drivers/imu.py"),
        PathBuf::from("micropython/main_loop.py"),
      ]
    );
  }

  #[test]
  fn ignores_non_python_files() {
    let temp = scaffold("[\"micropython\"]");
    fs::create_dir_all(temp.path().join("micropython")).unwrap();
    fs::write(temp.path().join("micropython/app.py"), "").unwrap();
    fs::write(temp.path().join("micropython/README.md"), "").unwrap();
    fs::write(temp.path().join("micropython/data.json"), "{}").unwrap();

    let project = Project::load(temp.path()).unwrap();
    let files = project.source_files().unwrap();

    assert_eq!(files, vec![PathBuf::from("micropython/app.py")]);
  }

  #[test]
  fn missing_source_dir_is_skipped() {
    let temp = scaffold("[\"micropython\", \"common\"]");
    fs::create_dir_all(temp.path().join("micropython")).unwrap();
    fs::write(temp.path().join("micropython/app.py"), "").unwrap();
    // no common/ at all

    let project = Project::load(temp.path()).unwrap();
    let files = project.source_files().unwrap();

    assert_eq!(files, vec![PathBuf::from("micropython/app.py")]);
  }

  #[test]
  fn empty_project_yields_empty_list() {
    let temp = scaffold("[\"micropython\"]");
    let project = Project::load(temp.path()).unwrap();
    assert!(project.source_files().unwrap().is_empty());
  }

  #[test]
  fn load_fails_without_root() {
    let temp = tempdir().unwrap();
    let result = Project::load(&temp.path().join("nope"));
    assert!(matches!(result, Err(ProjectError::BadRoot { .. })));
  }
}
