use anyhow::Result;
use std::io::{self, IsTerminal, Write};

/// Ask a yes/no question, defaulting to no.
///
/// Returns the default without prompting when stdin or stderr is not a
/// terminal, so scripted runs never block on input.
pub fn confirm_default_no(message: &str) -> Result<bool> {
  if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
    return Ok(false);
  }

  write!(io::stderr(), "{} [y/N] ", message)?;
  io::stderr().flush()?;

  let mut input = String::new();
  io::stdin().read_line(&mut input)?;

  Ok(matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
