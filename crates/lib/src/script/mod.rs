//! Script execution.
//!
//! Runs one Lua test script in its own VM and reports how it ended: it
//! completed, it raised an assertion (a verified failure), or it failed for
//! any other reason.
//!
//! # Submodules
//!
//! - [`cwd`] - working directory guard
//! - [`globals`] - the `bisect` table and `assert`
//! - [`runtime`] - VM construction and chunk loading
//! - [`types`] - errors and execution context

pub mod cwd;
pub mod globals;
pub mod runtime;
pub mod types;

use std::path::Path;

use tracing::{debug, info};

pub use cwd::CwdGuard;
pub use types::{AssertionFailure, ScriptContext, ScriptError};

/// Execute the script at `path`.
///
/// The process working directory is the same after this returns as it was
/// before, whatever the script did with `bisect.chdir`.
pub fn run_script(path: &Path, ctx: &ScriptContext) -> Result<(), ScriptError> {
  let script = std::path::absolute(path).map_err(|source| ScriptError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  let source = std::fs::read(&script).map_err(|source| ScriptError::Read {
    path: script.clone(),
    source,
  })?;

  let guard = CwdGuard::enter(ctx.workdir.as_deref()).map_err(|source| ScriptError::WorkDir {
    path: ctx.workdir.clone().unwrap_or_default(),
    source,
  })?;

  info!(script = %script.display(), site = ctx.site.is_some(), "running script");

  let lua = runtime::create_runtime(&script, ctx.site.as_ref())?;
  let result = runtime::exec_file(&lua, &script, source).map_err(ScriptError::from);

  drop(lua);
  debug!(dir = %guard.original().display(), "restoring working directory");
  drop(guard);

  result
}
