//! Manifest of required dirs, files, and hashes, rendered into the agent
//! program that runs on the board.

use std::collections::BTreeSet;

use crate::artifact::Artifact;

/// Device-side agent program. The three `{required_*}` placeholders are
/// substituted with Python list literals by `render_agent`.
const AGENT_TEMPLATE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../device/agent.py"));

/// Borrowed view over the artifact list in its protocol order.
///
/// The file and hash lists are rendered in artifact order, and the device
/// answers one flag per hash entry in that same order. That positional
/// contract is what lets the transfer loop pair flags with artifacts.
pub struct Manifest<'a> {
  artifacts: &'a [Artifact],
}

impl<'a> Manifest<'a> {
  pub fn new(artifacts: &'a [Artifact]) -> Self {
    Manifest { artifacts }
  }

  pub fn len(&self) -> usize {
    self.artifacts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.artifacts.is_empty()
  }

  /// Directories the device must have, sorted so parents precede children.
  ///
  /// Every ancestor is included, so the agent can walk the list with plain
  /// `mkdir` and never hit a missing parent.
  pub fn device_dirs(&self) -> Vec<String> {
    let mut dirs = BTreeSet::new();
    for artifact in self.artifacts {
      let mut dir = artifact.device_dir.as_str();
      while !dir.is_empty() {
        dirs.insert(dir.to_string());
        dir = &dir[..dir.rfind('/').unwrap_or(0)];
      }
    }
    dirs.into_iter().collect()
  }

  /// Device paths in artifact order.
  pub fn device_files(&self) -> Vec<&str> {
    self.artifacts.iter().map(|a| a.device_path.as_str()).collect()
  }

  /// `(device_path, hex hash)` pairs in artifact order.
  pub fn entries(&self) -> Vec<(&str, String)> {
    self
      .artifacts
      .iter()
      .map(|a| (a.device_path.as_str(), a.hash.to_hex()))
      .collect()
  }

  /// Render the agent program with this manifest substituted in.
  pub fn render_agent(&self) -> String {
    let dirs = python_str_list(self.device_dirs().iter().map(String::as_str));
    let files = python_str_list(self.device_files().into_iter());
    let hashes = python_pair_list(&self.entries());

    AGENT_TEMPLATE
      .replace("{required_dirs}", &dirs)
      .replace("{required_files}", &files)
      .replace("{required_hashes}", &hashes)
  }
}

fn python_quote(s: &str) -> String {
  // Backslash doubling must come first so a literal `\n` stays distinct
  // from a real newline.
  let escaped = s
    .replace('\\', "\\\\")
    .replace('"', "\\\"")
    .replace('\n', "\\n")
    .replace('\r', "\\r");
  format!("\"{escaped}\"")
}

fn python_str_list<'s>(items: impl Iterator<Item = &'s str>) -> String {
  let quoted: Vec<String> = items.map(python_quote).collect();
  format!("[{}]", quoted.join(", "))
}

fn python_pair_list(entries: &[(&str, String)]) -> String {
  let quoted: Vec<String> = entries
    .iter()
    .map(|(path, hash)| format!("[{}, {}]", python_quote(path), python_quote(hash)))
    .collect();
  format!("[{}]", quoted.join(", "))
}
