//! Clean rebuild-and-install of the project under test.
//!
//! Every build starts from an empty install layout, so nothing installed by a
//! previously tested revision can be picked up by the next one. The build
//! intermediate directory is also removed unless the caller opts out.
//!
//! # Submodules
//!
//! - [`execute`] - build tool subprocess handling
//! - [`types`] - options, environment and errors

pub mod execute;
mod types;

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::placeholder;
use crate::platform::Platform;
use crate::site::{LayoutResolver, SiteLayout, host_runtime_version};

pub use types::*;

/// Resolve a configured path against the project directory.
fn absolutize(base: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() { path.to_path_buf() } else { base.join(path) }
}

fn prepare_err(path: &Path) -> impl FnOnce(std::io::Error) -> BuildError {
  let path = path.to_path_buf();
  move |source| BuildError::Prepare { path, source }
}

/// Remove a directory tree if it exists.
async fn remove_tree(path: &Path) -> Result<(), BuildError> {
  match fs::remove_dir_all(path).await {
    Ok(()) => {
      debug!(path = %path.display(), "removed");
      Ok(())
    }
    Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
    Err(source) => Err(BuildError::Clean {
      path: path.to_path_buf(),
      source,
    }),
  }
}

/// Remove and recreate a directory so it exists and is empty.
async fn purge_dir(path: &Path) -> Result<(), BuildError> {
  remove_tree(path).await?;
  fs::create_dir_all(path).await.map_err(prepare_err(path))
}

/// Compute the install layout for a destination root on this host.
pub fn layout_for(dest_root: &Path) -> Result<SiteLayout, BuildError> {
  let platform = Platform::current().ok_or(BuildError::UnsupportedPlatform)?;
  let version = host_runtime_version().map_err(|e| BuildError::RuntimeVersion(e.to_string()))?;
  Ok(SiteLayout::new(dest_root, platform, &version))
}

/// Build and install the project, returning where it was installed.
///
/// Steps:
/// 1. Remove the build intermediate directory (skipped with `skip_clean`)
/// 2. Empty the native and pure-Lua module directories (always)
/// 3. Run the build tool with the build environment, output to the log
///
/// Running this twice for the same revision gives the same result.
pub async fn build(options: &BuildOptions) -> Result<SiteLayout, BuildError> {
  let project_dir = dunce::canonicalize(&options.project_dir).map_err(prepare_err(&options.project_dir))?;

  let dest_root = absolutize(&project_dir, &options.dest_root);
  fs::create_dir_all(&dest_root).await.map_err(prepare_err(&dest_root))?;
  let dest_root = dunce::canonicalize(&dest_root).map_err(prepare_err(&dest_root))?;

  let layout = layout_for(&dest_root)?;

  if options.skip_clean {
    info!("skipping clean of build directory");
  } else {
    remove_tree(&absolutize(&project_dir, &options.build_dir)).await?;
  }

  purge_dir(&layout.site_dir).await?;
  purge_dir(&layout.share_dir).await?;

  let resolver = LayoutResolver::new(&layout, &project_dir);
  let command = options
    .command
    .iter()
    .map(|arg| placeholder::substitute(arg, &resolver))
    .collect::<Result<Vec<_>, _>>()?;

  let env = options.env.resolve(&layout, std::env::var_os("PATH"))?;
  let log_file = absolutize(&project_dir, &options.log_file);

  execute::run_build_tool(&command, &env, &project_dir, &log_file, options.timeout).await?;

  info!(site = %layout.site_dir.display(), "build installed");
  Ok(layout)
}
