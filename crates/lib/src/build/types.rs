//! Types for the build step.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::placeholder::PlaceholderError;
use crate::site::SiteLayout;

/// Default build tool invocation.
pub const DEFAULT_COMMAND: &[&str] = &["make", "install", "PREFIX=$${prefix}", "LUA_VERSION=$${lua_version}"];

/// Default build intermediate directory, relative to the project.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Default destination root, relative to the project.
pub const DEFAULT_DEST: &str = "dist";

/// Default log file name, placed in the destination root.
pub const DEFAULT_LOG_NAME: &str = "build.log";

/// Environment overrides for the build subprocess.
///
/// Applied on top of the harness's own environment, for the child only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnv {
  /// Variables set (or replaced) in the child.
  pub vars: BTreeMap<String, String>,
  /// Directories put in front of the child's `PATH`, in order.
  pub path_prepend: Vec<PathBuf>,
}

impl BuildEnv {
  pub fn is_empty(&self) -> bool {
    self.vars.is_empty() && self.path_prepend.is_empty()
  }

  /// Compute the variables to set on the child.
  ///
  /// `layout` variables come first so configured variables can replace them.
  /// `ambient_path` is the `PATH` the child would otherwise inherit.
  pub fn resolve(
    &self,
    layout: &SiteLayout,
    ambient_path: Option<OsString>,
  ) -> Result<Vec<(OsString, OsString)>, BuildError> {
    let mut resolved: BTreeMap<OsString, OsString> = BTreeMap::new();

    for (key, value) in layout_vars(layout) {
      resolved.insert(key.into(), value);
    }
    for (key, value) in &self.vars {
      resolved.insert(key.into(), value.into());
    }

    if !self.path_prepend.is_empty() {
      let base = resolved.get(&OsString::from("PATH")).cloned().or(ambient_path);
      let mut dirs = self.path_prepend.clone();
      if let Some(base) = base {
        dirs.extend(std::env::split_paths(&base));
      }
      let joined = std::env::join_paths(dirs).map_err(|e| BuildError::Env(e.to_string()))?;
      resolved.insert("PATH".into(), joined);
    }

    Ok(resolved.into_iter().collect())
  }
}

fn layout_vars(layout: &SiteLayout) -> [(&'static str, OsString); 6] {
  [
    ("BISECT_DEST_ROOT", layout.dest_root.clone().into_os_string()),
    ("BISECT_PREFIX", layout.prefix.clone().into_os_string()),
    ("BISECT_SITE_DIR", layout.site_dir.clone().into_os_string()),
    ("BISECT_SHARE_DIR", layout.share_dir.clone().into_os_string()),
    ("LUA_VERSION", layout.lua_version.clone().into()),
    ("PREFIX", layout.prefix.clone().into_os_string()),
  ]
}

fn describe_exit(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {code}"),
    None => "no exit code (killed by signal)".to_string(),
  }
}

/// Everything the build step needs for one invocation.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Directory the build tool runs in.
  pub project_dir: PathBuf,
  /// Destination root; created if missing.
  pub dest_root: PathBuf,
  /// Build tool argv; arguments may contain placeholders.
  pub command: Vec<String>,
  /// Intermediate directory removed before building unless `skip_clean`.
  pub build_dir: PathBuf,
  /// Receives the tool's stdout and stderr.
  pub log_file: PathBuf,
  pub env: BuildEnv,
  pub skip_clean: bool,
  /// Kill the tool and fail if it runs longer than this.
  pub timeout: Option<Duration>,
}

impl BuildOptions {
  /// Options with the default command and directories for `project_dir`.
  pub fn for_project(project_dir: impl Into<PathBuf>) -> Self {
    let project_dir = project_dir.into();
    let dest_root = project_dir.join(DEFAULT_DEST);
    Self {
      build_dir: project_dir.join(DEFAULT_BUILD_DIR),
      log_file: dest_root.join(DEFAULT_LOG_NAME),
      command: DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect(),
      dest_root,
      project_dir,
      env: BuildEnv::default(),
      skip_clean: false,
      timeout: None,
    }
  }
}

/// Errors from the build step. Every variant means the revision cannot be
/// evaluated.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("build command is empty")]
  EmptyCommand,

  #[error("placeholder error: {0}")]
  Placeholder(#[from] PlaceholderError),

  #[error("invalid build environment: {0}")]
  Env(String),

  #[error("cannot determine runtime version: {0}")]
  RuntimeVersion(String),

  #[error("unsupported platform")]
  UnsupportedPlatform,

  #[error("cannot remove '{path}': {source}")]
  Clean {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("cannot prepare '{path}': {source}")]
  Prepare {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("cannot open build log '{path}': {source}")]
  Log {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("cannot start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("error waiting for build: {0}")]
  Wait(#[source] io::Error),

  #[error("build failed with {} (see {})", describe_exit(.code), .log.display())]
  Failed { code: Option<i32>, log: PathBuf },

  #[error("build timed out after {after:?} (see {})", .log.display())]
  TimedOut { after: Duration, log: PathBuf },
}
