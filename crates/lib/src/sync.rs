//! Deployment orchestrator.
//!
//! Drives one deployment end to end: compile every source into the scratch
//! directory, run the manifest agent on the board, read back the change
//! flags, transfer what differs, and point `main.py` at the entry module.
//! Strictly sequential; the first failure aborts the run, and the scratch
//! guard cleans up on every exit path.

use thiserror::Error;
use tracing::{info, warn};

use crate::artifact::{Artifact, ArtifactError, build_artifacts};
use crate::bitmap::{ChangeBitmap, ProtocolError};
use crate::compile::Compiler;
use crate::manifest::Manifest;
use crate::project::{Project, ProjectError};
use crate::scratch::{ScratchDir, ScratchError};
use crate::transport::{Transport, TransportError};

/// Device path of the bootstrap written during the Configuring stage.
pub const BOOTSTRAP_FILE: &str = "main.py";

#[derive(Debug, Error)]
pub enum SyncError {
  #[error(transparent)]
  Scratch(#[from] ScratchError),

  #[error(transparent)]
  Project(#[from] ProjectError),

  #[error(transparent)]
  Artifact(#[from] ArtifactError),

  #[error(transparent)]
  Protocol(#[from] ProtocolError),

  #[error(transparent)]
  Transport(#[from] TransportError),
}

/// Knobs for one deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
  /// Transfer every file regardless of what the board reports.
  pub force: bool,
}

/// Progress notifications delivered as each stage starts.
///
/// The library never prints; callers that want per-stage output observe
/// these events instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
  /// Compilation begins; `total` files will be compiled.
  Compiling { total: usize },
  /// The manifest agent is about to run on the board.
  Probing,
  /// One file is being transferred.
  Transferring { device_path: String },
  /// One file is current on the board and will not be sent.
  Skipped { device_path: String },
  /// The `main.py` bootstrap is being written.
  Configuring,
}

/// What one deployment did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
  /// Number of files in the manifest.
  pub total: usize,
  /// Device paths transferred, in manifest order.
  pub transferred: Vec<String>,
  /// Number of files the board already had.
  pub skipped: usize,
}

/// Run one deployment against the board.
///
/// The change bitmap is validated against the manifest length before any
/// pairing happens, forced or not; a mismatch means the board answered a
/// different manifest than the one sent, and nothing is transferred on top
/// of that. Partial device updates are not rolled back on failure; `--force`
/// on the next run is the recovery path. The bootstrap is always written,
/// with a warning first when its entry module matches nothing deployed.
pub fn sync(
  project: &Project,
  compiler: &impl Compiler,
  transport: &impl Transport,
  options: SyncOptions,
  mut observer: impl FnMut(&SyncEvent),
) -> Result<SyncOutcome, SyncError> {
  info!(root = %project.root().display(), force = options.force, "starting deployment");

  let scratch = ScratchDir::create(project.root())?;

  let sources = project.source_files()?;
  observer(&SyncEvent::Compiling { total: sources.len() });
  let artifacts = build_artifacts(project.root(), &sources, compiler, &scratch)?;

  let manifest = Manifest::new(&artifacts);
  let agent = manifest.render_agent();

  observer(&SyncEvent::Probing);
  let reply = transport.run_script(&agent)?;
  let bitmap = ChangeBitmap::parse(&reply, manifest.len())?;
  info!(changed = bitmap.changed_count(), total = bitmap.len(), "board reported changes");

  let mut transferred = Vec::new();
  let mut skipped = 0usize;
  for (artifact, changed) in artifacts.iter().zip(bitmap.iter()) {
    if changed || options.force {
      observer(&SyncEvent::Transferring {
        device_path: artifact.device_path.clone(),
      });
      transport.put(&artifact.compiled_path, &artifact.device_path)?;
      transferred.push(artifact.device_path.clone());
    } else {
      observer(&SyncEvent::Skipped {
        device_path: artifact.device_path.clone(),
      });
      skipped += 1;
    }
  }

  observer(&SyncEvent::Configuring);
  let entry = &project.config().entry;
  if !bootstrap_can_resolve(entry, &artifacts) {
    warn!(entry = %entry, "entry module is not among the deployed files; main.py may fail to import it at boot");
  }
  let bootstrap = format!("import {entry}\n");
  transport.put_source(&bootstrap, BOOTSTRAP_FILE)?;

  info!(
    total = artifacts.len(),
    transferred = transferred.len(),
    skipped,
    "deployment finished"
  );

  Ok(SyncOutcome {
    total: artifacts.len(),
    transferred,
    skipped,
  })
}

/// Whether the entry's leading module matches a deployed root-level module
/// or package directory. Frozen firmware modules are invisible to this
/// check.
fn bootstrap_can_resolve(entry: &str, artifacts: &[Artifact]) -> bool {
  let head = entry.split_once('.').map_or(entry, |(head, _)| head);
  let module = format!("{head}.mpy");
  let package = format!("{head}/");
  artifacts
    .iter()
    .any(|a| a.device_path == module || a.device_path.starts_with(&package))
}
