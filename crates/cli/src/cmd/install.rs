//! Implementation of the `mpysync install` command.
//!
//! Runs one deployment end to end, printing a progress line as each stage
//! starts, then offers to register the project for auto-start at login.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use mpysync_lib::autostart::install_autostart;
use mpysync_lib::compile::MpyCross;
use mpysync_lib::project::Project;
use mpysync_lib::sync::{SyncEvent, SyncOptions, sync};
use mpysync_lib::transport::AmpyTransport;

use crate::output;
use crate::prompts;

/// Execute the install command.
///
/// Compiles every project source, asks the board which compiled files differ
/// from what it already has, transfers those (all of them under `--force`),
/// and rewrites the `main.py` bootstrap. The auto-start offer at the end is
/// interactive only; non-interactive runs skip it.
pub fn cmd_install(path: &Path, port: &str, force: bool) -> Result<()> {
  let project = Project::load(path).context("Failed to load project")?;

  let started = Instant::now();
  let outcome = sync(
    &project,
    &MpyCross,
    &AmpyTransport::new(port),
    SyncOptions { force },
    print_event,
  )
  .context("Deployment failed")?;

  output::print_success(&format!(
    "Done! {} of {} file(s) transferred, {} unchanged ({})",
    outcome.transferred.len(),
    outcome.total,
    outcome.skipped,
    output::format_duration(started.elapsed())
  ));

  offer_autostart(&project)?;

  Ok(())
}

fn print_event(event: &SyncEvent) {
  match event {
    SyncEvent::Compiling { total } => println!("Compiling {total} file(s)..."),
    SyncEvent::Probing => println!("Preparing board..."),
    SyncEvent::Transferring { device_path } => println!("Transferring {device_path}..."),
    SyncEvent::Skipped { device_path } => debug!(file = %device_path, "unchanged, skipping"),
    SyncEvent::Configuring => println!("Configuring \"main.py\"..."),
  }
}

fn offer_autostart(project: &Project) -> Result<()> {
  if !prompts::confirm_default_no("Add project to auto-start?")? {
    return Ok(());
  }

  let config = project.config();
  let path = install_autostart(&config.name, &config.description, &autostart_exec(project.root()))
    .context("Failed to install auto-start entry")?;
  output::print_info(&format!("Auto-start entry written to {}", path.display()));

  Ok(())
}

/// Command line the desktop entry re-invokes at login.
fn autostart_exec(root: &Path) -> String {
  let exe = std::env::current_exe()
    .map(|p| p.display().to_string())
    .unwrap_or_else(|_| "mpysync".to_string());
  format!("{} run {}", exe, root.display())
}
