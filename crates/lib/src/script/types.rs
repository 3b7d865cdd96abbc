//! Error and context types for script execution.

use std::io;
use std::path::PathBuf;

use mlua::prelude::*;
use thiserror::Error;

use crate::site::SiteLayout;

/// Payload raised by `assert` and `bisect.fail` inside a script.
///
/// Carried through mlua as an external error so it can be told apart from
/// every other Lua error after the chunk unwinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AssertionFailure {
  pub message: String,
}

impl AssertionFailure {
  pub fn new(message: impl Into<String>) -> Self {
    Self { message: message.into() }
  }
}

/// Why a script did not complete.
#[derive(Debug, Error)]
pub enum ScriptError {
  /// The script signalled that the behaviour under test does not hold.
  #[error("{0}")]
  Assertion(AssertionFailure),

  #[error("cannot read script '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("cannot enter working directory '{path}': {source}")]
  WorkDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// Any other Lua error: syntax, missing module, runtime error.
  #[error("{0}")]
  Lua(LuaError),
}

impl ScriptError {
  pub fn is_assertion(&self) -> bool {
    matches!(self, ScriptError::Assertion(_))
  }
}

impl From<LuaError> for ScriptError {
  fn from(err: LuaError) -> Self {
    match find_assertion(&err) {
      Some(failure) => ScriptError::Assertion(failure.clone()),
      None => ScriptError::Lua(err),
    }
  }
}

/// Walk the callback and context wrappers mlua adds around external errors.
pub fn find_assertion(err: &LuaError) -> Option<&AssertionFailure> {
  match err {
    LuaError::ExternalError(inner) => inner.downcast_ref::<AssertionFailure>(),
    LuaError::CallbackError { cause, .. } => find_assertion(cause),
    LuaError::WithContext { cause, .. } => find_assertion(cause),
    _ => None,
  }
}

/// What a single script execution may see.
#[derive(Debug, Clone, Default)]
pub struct ScriptContext {
  /// Directory to run in; the caller's directory is restored afterwards.
  pub workdir: Option<PathBuf>,
  /// Install layout to resolve modules from. `None` for the pre-script.
  pub site: Option<SiteLayout>,
}
