//! Harness configuration loaded from a Lua file.
//!
//! The file returns a table; every key is optional:
//!
//! ```lua
//! return {
//!   build = {
//!     command = { "make", "install", "PREFIX=$${prefix}" },
//!     build_dir = "build",
//!     dest = "dist",
//!     log = "dist/build.log",
//!     timeout = 1800,
//!     env = { OPT = "-ggdb", CCACHE_DIR = "/tmp/ccache" },
//!     path = { "/usr/lib/ccache" },
//!   },
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mlua::prelude::*;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::build::{BuildEnv, BuildOptions, DEFAULT_LOG_NAME};
use crate::consts::CONFIG_FILE_NAME;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("cannot read config '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  // mlua errors are not Send + Sync, so only the message is kept
  #[error("failed to evaluate config '{path}': {message}")]
  Eval { path: PathBuf, message: String },

  #[error("invalid config '{path}': {message}")]
  Invalid { path: PathBuf, message: String },
}

/// Top-level config table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
  pub build: BuildSection,
}

/// The `build` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
  pub command: Option<Vec<String>>,
  pub build_dir: Option<PathBuf>,
  pub dest: Option<PathBuf>,
  pub log: Option<PathBuf>,
  /// Seconds.
  pub timeout: Option<u64>,
  pub env: BTreeMap<String, String>,
  pub path: Vec<PathBuf>,
}

impl HarnessConfig {
  /// Evaluate a config file.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let source = std::fs::read(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let lua = Lua::new();
    let value = lua
      .load(source)
      .set_name(format!("@{}", path.display()))
      .eval::<LuaValue>()
      .map_err(|e| ConfigError::Eval {
        path: path.to_path_buf(),
        message: e.to_string(),
      })?;

    if !value.is_table() {
      return Err(ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("expected a table, got {}", value.type_name()),
      });
    }

    let config: HarnessConfig = lua.from_value(value).map_err(|e| ConfigError::Invalid {
      path: path.to_path_buf(),
      message: e.to_string(),
    })?;

    debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
  }

  /// Load an explicit config, or `bisectrun.lua` in the project if present.
  pub fn load(explicit: Option<&Path>, project_dir: &Path) -> Result<Self, ConfigError> {
    match explicit {
      Some(path) => Self::from_file(path),
      None => {
        let candidate = project_dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
          Self::from_file(&candidate)
        } else {
          Ok(Self::default())
        }
      }
    }
  }

  /// Build step options for `project_dir`, defaults filled in.
  pub fn build_options(&self, project_dir: &Path) -> BuildOptions {
    let mut options = BuildOptions::for_project(project_dir);
    let section = &self.build;

    if let Some(command) = &section.command {
      options.command = command.clone();
    }
    if let Some(build_dir) = &section.build_dir {
      options.build_dir = project_dir.join(build_dir);
    }
    if let Some(dest) = &section.dest {
      options.dest_root = project_dir.join(dest);
      options.log_file = options.dest_root.join(DEFAULT_LOG_NAME);
    }
    if let Some(log) = &section.log {
      options.log_file = project_dir.join(log);
    }
    options.timeout = section.timeout.map(Duration::from_secs);
    options.env = BuildEnv {
      vars: section.env.clone(),
      path_prepend: section.path.clone(),
    };

    options
  }
}
