//! Serial transport collaborator.
//!
//! All device I/O goes through the external `ampy` tool, one invocation per
//! operation, no persistent connection. The `Transport` trait exists so the
//! orchestrator can run against an in-process fake board.

use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

/// Environment variable naming the `ampy` executable to invoke.
pub const AMPY_ENV: &str = "MPYSYNC_AMPY";

#[derive(Debug, Error)]
pub enum TransportError {
  #[error("failed to launch {program}: {source}")]
  Spawn { program: String, source: std::io::Error },

  #[error("{program} {operation} failed with exit code {code:?}: {stderr}")]
  CommandFailed {
    program: String,
    operation: String,
    code: Option<i32>,
    stderr: String,
  },

  #[error("failed to stage script for the board: {0}")]
  Stage(#[source] std::io::Error),
}

/// Moves bytes to and runs code on the board.
pub trait Transport {
  /// Execute a Python script on the board and capture its stdout.
  fn run_script(&self, script: &str) -> Result<String, TransportError>;

  /// Copy a local file to `device_path` on the board.
  fn put(&self, local: &Path, device_path: &str) -> Result<(), TransportError>;

  /// Write literal source text to `device_path` on the board.
  fn put_source(&self, content: &str, device_path: &str) -> Result<(), TransportError> {
    let staged = stage(content)?;
    self.put(staged.path(), device_path)
  }
}

fn stage(content: &str) -> Result<NamedTempFile, TransportError> {
  let mut staged = NamedTempFile::new().map_err(TransportError::Stage)?;
  staged.write_all(content.as_bytes()).map_err(TransportError::Stage)?;
  staged.flush().map_err(TransportError::Stage)?;
  Ok(staged)
}

/// The real transport: `ampy -p <port> <operation> ...`, blocking.
pub struct AmpyTransport {
  port: String,
}

impl AmpyTransport {
  pub fn new(port: impl Into<String>) -> Self {
    AmpyTransport { port: port.into() }
  }

  fn program() -> String {
    std::env::var(AMPY_ENV).unwrap_or_else(|_| "ampy".to_string())
  }

  fn invoke(&self, operation: &str, args: &[&OsStr]) -> Result<String, TransportError> {
    let program = Self::program();
    debug!(program = %program, port = %self.port, operation = %operation, "invoking transport");

    let output = Command::new(&program)
      .arg("-p")
      .arg(&self.port)
      .arg(operation)
      .args(args)
      .output()
      .map_err(|e| TransportError::Spawn {
        program: program.clone(),
        source: e,
      })?;

    if !output.status.success() {
      return Err(TransportError::CommandFailed {
        program,
        operation: operation.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }
}

impl Transport for AmpyTransport {
  fn run_script(&self, script: &str) -> Result<String, TransportError> {
    let staged = stage(script)?;
    self.invoke("run", &[staged.path().as_os_str()])
  }

  fn put(&self, local: &Path, device_path: &str) -> Result<(), TransportError> {
    self.invoke("put", &[local.as_os_str(), OsStr::new(device_path)])?;
    Ok(())
  }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
  use super::*;
  use serial_test::serial;
  use std::fs;
  use std::os::unix::fs::PermissionsExt;
  use std::path::PathBuf;
  use tempfile::tempdir;

  /// Fake ampy that records its argv and mirrors `run`/`put` into files
  /// under its own directory.
  fn write_fake_ampy(dir: &Path) -> PathBuf {
    let path = dir.join("fake-ampy");
    let body = r#"#!/bin/sh
here="$(dirname "$0")"
echo "$@" > "$here/argv"
case "$3" in
  run) cat "$4" ;;
  put) cp "$4" "$here/put_content"; echo "$5" > "$here/put_dest" ;;
esac
"#;
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
  }

  #[test]
  #[serial]
  fn run_script_stages_and_captures_stdout() {
    let temp = tempdir().unwrap();
    let script = write_fake_ampy(temp.path());

    let output = temp_env::with_var(AMPY_ENV, Some(script.to_str().unwrap()), || {
      AmpyTransport::new("/dev/ttyUSB0").run_script("print(1)\nprint(0)\n").unwrap()
    });

    assert_eq!(output, "print(1)\nprint(0)\n");
    let argv = fs::read_to_string(temp.path().join("argv")).unwrap();
    assert!(argv.starts_with("-p /dev/ttyUSB0 run "));
  }

  #[test]
  #[serial]
  fn put_passes_local_and_device_paths() {
    let temp = tempdir().unwrap();
    let script = write_fake_ampy(temp.path());
    let local = temp.path().join("app.mpy");
    fs::write(&local, b"compiled").unwrap();

    temp_env::with_var(AMPY_ENV, Some(script.to_str().unwrap()), || {
      AmpyTransport::new("/dev/ttyUSB0").put(&local, "micropython/app.mpy").unwrap();
    });

    assert_eq!(fs::read(temp.path().join("put_content")).unwrap(), b"compiled");
    assert_eq!(
      fs::read_to_string(temp.path().join("put_dest")).unwrap().trim(),
      "micropython/app.mpy"
    );
  }

  #[test]
  #[serial]
  fn put_source_stages_literal_content() {
    let temp = tempdir().unwrap();
    let script = write_fake_ampy(temp.path());

    temp_env::with_var(AMPY_ENV, Some(script.to_str().unwrap()), || {
      AmpyTransport::new("/dev/ttyUSB0")
        .put_source("import glove.app\n", "main.py")
        .unwrap();
    });

    assert_eq!(fs::read_to_string(temp.path().join("put_content")).unwrap(), "import glove.app\n");
    assert_eq!(fs::read_to_string(temp.path().join("put_dest")).unwrap().trim(), "main.py");
  }

  #[test]
  #[serial]
  fn nonzero_exit_reports_operation_and_stderr() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("fake-ampy");
    fs::write(&path, "#!/bin/sh\necho 'could not open port' >&2\nexit 2\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

    let err = temp_env::with_var(AMPY_ENV, Some(path.to_str().unwrap()), || {
      AmpyTransport::new("/dev/ttyUSB0").run_script("print(1)").unwrap_err()
    });

    match err {
      TransportError::CommandFailed {
        operation, code, stderr, ..
      } => {
        assert_eq!(operation, "run");
        assert_eq!(code, Some(2));
        assert_eq!(stderr, "could not open port");
      }
      other => panic!("expected CommandFailed, got {other:?}"),
    }
  }

  #[test]
  #[serial]
  fn missing_executable_is_spawn_error() {
    let err = temp_env::with_var(AMPY_ENV, Some("/nonexistent/ampy"), || {
      AmpyTransport::new("/dev/ttyUSB0").run_script("print(1)").unwrap_err()
    });
    assert!(matches!(err, TransportError::Spawn { .. }));
  }
}
