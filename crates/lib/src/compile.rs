//! Cross-compiler collaborator.
//!
//! Compilation is delegated to the external `mpy-cross` executable. It sits
//! behind the `Compiler` trait so the orchestrator can be exercised with an
//! in-process fake.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Environment variable naming the `mpy-cross` executable to invoke.
pub const MPY_CROSS_ENV: &str = "MPYSYNC_MPY_CROSS";

#[derive(Debug, Error)]
pub enum CompileError {
  #[error("failed to launch {program}: {source}")]
  Spawn { program: String, source: std::io::Error },

  #[error("compiling {} failed with exit code {code:?}: {stderr}", source_path.display())]
  Failed {
    source_path: PathBuf,
    code: Option<i32>,
    stderr: String,
  },
}

/// Turns one source file into one compiled artifact.
pub trait Compiler {
  fn compile(&self, source: &Path, output: &Path) -> Result<(), CompileError>;
}

/// The real compiler: `mpy-cross <source> -o <output>`, blocking.
#[derive(Debug, Default)]
pub struct MpyCross;

impl MpyCross {
  fn program() -> String {
    std::env::var(MPY_CROSS_ENV).unwrap_or_else(|_| "mpy-cross".to_string())
  }
}

impl Compiler for MpyCross {
  fn compile(&self, source: &Path, output: &Path) -> Result<(), CompileError> {
    let program = Self::program();
    debug!(program = %program, source = %source.display(), "compiling");

    let result = Command::new(&program)
      .arg(source)
      .arg("-o")
      .arg(output)
      .output()
      .map_err(|e| CompileError::Spawn {
        program: program.clone(),
        source: e,
      })?;

    if !result.status.success() {
      return Err(CompileError::Failed {
        source_path: source.to_path_buf(),
        code: result.status.code(),
        stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
      });
    }

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
  use tempfile::tempdir;

  fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-mpy-cross");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
  }

  #[test]
  #[serial]
  fn successful_compile_writes_output() {
    let temp = tempdir().unwrap();
    let script = write_script(temp.path(), "cp \"$1\" \"$3\"");
    let source = temp.path().join("app.py");
    let output = temp.path().join("app.mpy");
    fs::write(&source, "print('hi')").unwrap();

    temp_env::with_var(MPY_CROSS_ENV, Some(script.to_str().unwrap()), || {
      MpyCross.compile(&source, &output).unwrap();
    });

    assert_eq!(fs::read(&output).unwrap(), b"print('hi')");
  }

  #[test]
  #[serial]
  fn nonzero_exit_reports_stderr() {
    let temp = tempdir().unwrap();
    let script = write_script(temp.path(), "echo 'SyntaxError' >&2; exit 1");
    let source = temp.path().join("broken.py");
    fs::write(&source, "def (").unwrap();

    let err = temp_env::with_var(MPY_CROSS_ENV, Some(script.to_str().unwrap()), || {
      MpyCross.compile(&source, &temp.path().join("broken.mpy")).unwrap_err()
    });

    match err {
      CompileError::Failed { code, stderr, .. } => {
        assert_eq!(code, Some(1));
        assert_eq!(stderr, "SyntaxError");
      }
      other => panic!("expected Failed, got {other:?}"),
    }
  }

  #[test]
  #[serial]
  fn missing_executable_is_spawn_error() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("app.py");
    fs::write(&source, "").unwrap();

    let err = temp_env::with_var(MPY_CROSS_ENV, Some("/nonexistent/mpy-cross"), || {
      MpyCross.compile(&source, &temp.path().join("app.mpy")).unwrap_err()
    });

    assert!(matches!(err, CompileError::Spawn { .. }));
  }
}
