//! Compiled artifact descriptors.
//!
//! An `Artifact` ties together the four identities of one deployable file:
//! the source on the host, the compiled output in the scratch directory, the
//! hash of those compiled bytes, and the destination path on the device.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::compile::{CompileError, Compiler};
use crate::hash::{ContentHash, HashError, hash_file};
use crate::scratch::ScratchDir;

/// Extension carried by compiled artifacts, on the host and on the device.
pub const COMPILED_EXT: &str = "mpy";

#[derive(Debug, Error)]
pub enum ArtifactError {
  #[error(transparent)]
  Compile(#[from] CompileError),

  #[error(transparent)]
  Hash(#[from] HashError),

  #[error("failed to create {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },
}

/// One deployable file, immutable once built.
#[derive(Debug, Clone)]
pub struct Artifact {
  /// Absolute path of the source file on the host.
  pub source_path: PathBuf,
  /// Absolute path of the compiled output inside the scratch directory.
  pub compiled_path: PathBuf,
  /// SHA-1 of the compiled bytes.
  pub hash: ContentHash,
  /// Destination path on the device, forward-slash separated.
  pub device_path: String,
  /// Directory portion of `device_path`; empty for root-level files.
  pub device_dir: String,
}

/// Join a relative path with forward slashes regardless of the host OS.
/// Device paths are always `/`-separated.
fn device_join(rel: &Path) -> String {
  rel
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}

fn device_paths(rel_source: &Path) -> (String, String) {
  let compiled_rel = rel_source.with_extension(COMPILED_EXT);
  let device_path = device_join(&compiled_rel);
  let device_dir = compiled_rel.parent().map(device_join).unwrap_or_default();
  (device_path, device_dir)
}

/// Compile and hash every source file, strictly in the given order.
///
/// `sources` are project-relative paths; compiled outputs mirror that layout
/// inside the scratch directory, so equal basenames under different source
/// dirs cannot clobber each other. The first compiler failure aborts the
/// whole batch.
pub fn build_artifacts(
  root: &Path,
  sources: &[PathBuf],
  compiler: &impl Compiler,
  scratch: &ScratchDir,
) -> Result<Vec<Artifact>, ArtifactError> {
  let mut artifacts = Vec::with_capacity(sources.len());

  for rel in sources {
    let source_path = root.join(rel);
    let compiled_rel = rel.with_extension(COMPILED_EXT);
    let compiled_path = scratch.path().join(&compiled_rel);

    if let Some(parent) = compiled_path.parent() {
      fs::create_dir_all(parent).map_err(|e| ArtifactError::CreateDir {
        path: parent.to_path_buf(),
        source: e,
      })?;
    }

    compiler.compile(&source_path, &compiled_path)?;
    let hash = hash_file(&compiled_path)?;

    let (device_path, device_dir) = device_paths(rel);
    debug!(file = %device_path, hash = %hash, "compiled");

    artifacts.push(Artifact {
      source_path,
      compiled_path,
      hash,
      device_path,
      device_dir,
    });
  }

  Ok(artifacts)
}
