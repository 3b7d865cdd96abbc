//! Scoped working directory.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Restores the process working directory when dropped.
///
/// Restoration also happens while unwinding from a panic.
#[derive(Debug)]
pub struct CwdGuard {
  original: PathBuf,
}

impl CwdGuard {
  /// Remember the current directory and optionally switch to `dir`.
  pub fn enter(dir: Option<&Path>) -> io::Result<Self> {
    let original = std::env::current_dir()?;
    if let Some(dir) = dir {
      debug!(from = %original.display(), to = %dir.display(), "entering directory");
      std::env::set_current_dir(dir)?;
    }
    Ok(Self { original })
  }

  pub fn original(&self) -> &Path {
    &self.original
  }
}

impl Drop for CwdGuard {
  fn drop(&mut self) {
    if let Err(err) = std::env::set_current_dir(&self.original) {
      warn!(dir = %self.original.display(), error = %err, "failed to restore working directory");
    }
  }
}
