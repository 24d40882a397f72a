//! Project configuration, read from `mpysync.toml` at the project root.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File name looked up in the project root.
pub const CONFIG_FILE: &str = "mpysync.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("no {CONFIG_FILE} found in {}", root.display())]
  NotFound { root: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("project.name must not be empty")]
  EmptyName,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
  project: ProjectSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectSection {
  name: String,
  #[serde(default)]
  description: String,
  sources: Option<Vec<String>>,
  entry: Option<String>,
}

/// Resolved project configuration.
///
/// `sources` are directories relative to the project root that hold the
/// `.py` files to deploy. `entry` is the module imported by the generated
/// `main.py` bootstrap. Both default from `name`, following the conventional
/// package layout: sources `<name>/micropython` and `<name>/common`, entry
/// `<name>.micropython.<name>`, which lives inside the first default source.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
  pub name: String,
  pub description: String,
  pub sources: Vec<String>,
  pub entry: String,
}

impl ProjectConfig {
  /// Load and validate `mpysync.toml` from the project root.
  pub fn load(root: &Path) -> Result<Self, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
      return Err(ConfigError::NotFound {
        root: root.to_path_buf(),
      });
    }

    let content = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
      path: path.clone(),
      source: e,
    })?;
    let file: ConfigFile = toml::from_str(&content).map_err(|e| ConfigError::Parse { path, source: e })?;

    if file.project.name.trim().is_empty() {
      return Err(ConfigError::EmptyName);
    }

    let name = file.project.name;
    let sources = file
      .project
      .sources
      .unwrap_or_else(|| vec![format!("{name}/micropython"), format!("{name}/common")]);
    let entry = file
      .project
      .entry
      .unwrap_or_else(|| format!("{name}.micropython.{name}"));
    Ok(ProjectConfig {
      name,
      description: file.project.description,
      sources,
      entry,
    })
  }
}
