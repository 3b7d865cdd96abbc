//! The build-isolate-run-classify pipeline.
//!
//! Stages run strictly in order and the first one that does not succeed
//! decides the outcome:
//!
//! 1. pre-script (optional, no access to the new build)
//! 2. build and install
//! 3. install check of the module directories
//! 4. main script, resolving modules from the new build first

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::build::{self, BuildOptions};
use crate::outcome::Outcome;
use crate::script::{ScriptContext, run_script};

/// One harness invocation.
#[derive(Debug, Clone)]
pub struct RunOptions {
  /// The test script deciding good or bad.
  pub script: PathBuf,
  /// Optional script run before building.
  pub pre_script: Option<PathBuf>,
  pub build: BuildOptions,
}

fn absolute(path: &Path) -> Result<PathBuf, Outcome> {
  std::path::absolute(path)
    .map_err(|e| Outcome::Inconclusive(format!("cannot resolve '{}': {}", path.display(), e)))
}

fn require_file(path: &Path, what: &str) -> Result<PathBuf, Outcome> {
  let path = absolute(path)?;
  if path.is_file() {
    Ok(path)
  } else {
    Err(Outcome::Inconclusive(format!("{what} not found: {}", path.display())))
  }
}

/// Run the whole pipeline and classify the result.
///
/// Never fails: every error is mapped onto an [`Outcome`].
pub async fn run(options: &RunOptions) -> Outcome {
  match run_stages(options).await {
    Ok(()) => Outcome::Success,
    Err(outcome) => outcome,
  }
}

async fn run_stages(options: &RunOptions) -> Result<(), Outcome> {
  // Resolve paths before anything can change the working directory
  let script = require_file(&options.script, "script")?;
  let pre_script = options
    .pre_script
    .as_deref()
    .map(|p| require_file(p, "pre-script"))
    .transpose()?;
  let project_dir = absolute(&options.build.project_dir)?;

  if let Some(pre_script) = pre_script {
    info!(script = %pre_script.display(), "stage: pre-script");
    let ctx = ScriptContext {
      workdir: Some(project_dir.clone()),
      site: None,
    };
    run_script(&pre_script, &ctx).map_err(|e| Outcome::from_pre_script_error(&e))?;
  }

  info!(project = %project_dir.display(), "stage: build");
  let layout = build::build(&options.build).await.map_err(|e| {
    warn!(error = %e, "build failed");
    Outcome::from_build_error(&e)
  })?;

  info!(site = %layout.site_dir.display(), "stage: install");
  for dir in [&layout.site_dir, &layout.share_dir] {
    if !dir.is_dir() {
      return Err(Outcome::Inconclusive(format!(
        "install directory missing after build: {}",
        dir.display()
      )));
    }
  }

  info!(script = %script.display(), "stage: script");
  let ctx = ScriptContext {
    workdir: Some(project_dir),
    site: Some(layout),
  };
  run_script(&script, &ctx).map_err(|e| Outcome::from_script_error(&e))
}
