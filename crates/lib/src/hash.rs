//! Content hashing for compiled artifacts.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};
use thiserror::Error;

/// A 20-byte SHA-1 digest of a compiled artifact's bytes.
///
/// Rendered as 40 lowercase hex characters wherever it crosses to the device.
/// Hashes are always computed over compiled output, never over source bytes,
/// so a source edit that compiles to identical bytecode does not trigger a
/// transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 20]);

impl ContentHash {
  pub fn to_hex(&self) -> String {
    hex::encode(self.0)
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.to_hex())
  }
}

#[derive(Debug, Error)]
pub enum HashError {
  #[error("failed to read {}: {source}", path.display())]
  ReadFile { path: PathBuf, source: std::io::Error },
}

/// Hash a file's contents.
///
/// Streams the file in 8 KiB chunks; compiled artifacts are small but there
/// is no reason to buffer them whole.
pub fn hash_file(path: &Path) -> Result<ContentHash, HashError> {
  let mut file = fs::File::open(path).map_err(|e| HashError::ReadFile {
    path: path.to_path_buf(),
    source: e,
  })?;

  let mut hasher = Sha1::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(|e| HashError::ReadFile {
      path: path.to_path_buf(),
      source: e,
    })?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(hasher.finalize().into()))
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha1::new();
  hasher.update(data);
  ContentHash(hasher.finalize().into())
}
