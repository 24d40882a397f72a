//! Implementation of the `mpysync run` command.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

use mpysync_lib::project::Project;

/// Environment variable naming the Python interpreter used for local runs.
pub const PYTHON_ENV: &str = "MPYSYNC_PYTHON";

/// Execute the run command.
///
/// Launches the project's entry module locally with `python3 -m <entry>`
/// from the project root and propagates its exit status.
pub fn cmd_run(path: &Path) -> Result<()> {
  let project = Project::load(path).context("Failed to load project")?;
  let entry = project.config().entry.clone();
  let python = std::env::var(PYTHON_ENV).unwrap_or_else(|_| "python3".to_string());

  debug!(python = %python, entry = %entry, "launching runtime");

  let status = Command::new(&python)
    .arg("-m")
    .arg(&entry)
    .current_dir(project.root())
    .status()
    .with_context(|| format!("Failed to launch {python}"))?;

  if !status.success() {
    std::process::exit(status.code().unwrap_or(1));
  }

  Ok(())
}
