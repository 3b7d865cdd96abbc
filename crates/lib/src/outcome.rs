//! Classification of a run into the bisection exit protocol.
//!
//! `git bisect run` reads the exit code of the harness:
//! - `0` marks the revision good
//! - `1` marks it bad
//! - `125` skips it because it could not be evaluated

use std::fmt;

use serde::Serialize;

use crate::build::BuildError;
use crate::script::ScriptError;

/// Exit code telling the bisection driver to skip the revision.
pub const SKIP_EXIT_CODE: u8 = 125;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
  /// The script completed without signalling a failure.
  Success,
  /// The script signalled that the behaviour under test does not hold.
  VerifiedFailure(String),
  /// The revision could not be evaluated.
  Inconclusive(String),
}

impl Outcome {
  pub fn exit_code(&self) -> u8 {
    match self {
      Outcome::Success => 0,
      Outcome::VerifiedFailure(_) => 1,
      Outcome::Inconclusive(_) => SKIP_EXIT_CODE,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Outcome::Success => "success",
      Outcome::VerifiedFailure(_) => "failed",
      Outcome::Inconclusive(_) => "cannot run",
    }
  }

  pub fn detail(&self) -> Option<&str> {
    match self {
      Outcome::Success => None,
      Outcome::VerifiedFailure(detail) | Outcome::Inconclusive(detail) => Some(detail),
    }
  }

  /// Classify a script error. Only assertions are verified failures.
  pub fn from_script_error(err: &ScriptError) -> Self {
    match err {
      ScriptError::Assertion(failure) => Outcome::VerifiedFailure(failure.message.clone()),
      other => Outcome::Inconclusive(error_summary(&other.to_string())),
    }
  }

  /// Classify a script error raised before the build ran.
  pub fn from_pre_script_error(err: &ScriptError) -> Self {
    match Self::from_script_error(err) {
      Outcome::Inconclusive(detail) => Outcome::Inconclusive(format!("pre-script: {detail}")),
      outcome => outcome,
    }
  }

  /// A failed build never says anything about the behaviour under test.
  pub fn from_build_error(err: &BuildError) -> Self {
    Outcome::Inconclusive(err.to_string())
  }
}

/// Lua error text up to the traceback, folded onto one line.
///
/// `require` failures put the reason (`undefined symbol: ...`) on the lines
/// after the first, so those are kept.
fn error_summary(message: &str) -> String {
  message
    .lines()
    .take_while(|line| !line.trim_start().starts_with("stack traceback:"))
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

impl fmt::Display for Outcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.detail() {
      Some(detail) => write!(f, "{}: {}", self.label(), detail),
      None => write!(f, "{}", self.label()),
    }
  }
}
