//! Change bitmap reported back by the device agent.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
  #[error("device reported {actual} change flags, expected {expected}")]
  LengthMismatch { expected: usize, actual: usize },

  #[error("device reported a non-numeric change flag: {token:?}")]
  BadFlag { token: String },
}

/// Per-file changed flags, positionally aligned with the manifest entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBitmap {
  flags: Vec<bool>,
}

impl ChangeBitmap {
  /// Parse the agent's reply: whitespace-separated integers, one per
  /// manifest entry, nonzero meaning changed.
  ///
  /// The token count must equal `expected_len` exactly. Anything else means
  /// the device answered a manifest other than the one we sent, and no
  /// positional pairing with artifacts is sound; the caller must abort.
  pub fn parse(output: &str, expected_len: usize) -> Result<Self, ProtocolError> {
    let tokens: Vec<&str> = output.split_whitespace().collect();
    if tokens.len() != expected_len {
      return Err(ProtocolError::LengthMismatch {
        expected: expected_len,
        actual: tokens.len(),
      });
    }

    let mut flags = Vec::with_capacity(tokens.len());
    for token in tokens {
      let value: i64 = token.parse().map_err(|_| ProtocolError::BadFlag {
        token: token.to_string(),
      })?;
      flags.push(value != 0);
    }

    Ok(ChangeBitmap { flags })
  }

  pub fn len(&self) -> usize {
    self.flags.len()
  }

  pub fn is_empty(&self) -> bool {
    self.flags.is_empty()
  }

  pub fn changed_count(&self) -> usize {
    self.flags.iter().filter(|changed| **changed).count()
  }

  pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
    self.flags.iter().copied()
  }
}
