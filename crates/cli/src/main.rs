//! `bisectrun` - rebuild a project and run a Lua test script, reporting the
//! result with the exit codes `git bisect run` understands.

mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use bisectrun_lib::build::DEFAULT_LOG_NAME;
use bisectrun_lib::config::HarnessConfig;
use bisectrun_lib::consts::APP_NAME;
use bisectrun_lib::outcome::{Outcome, SKIP_EXIT_CODE};
use bisectrun_lib::runner::{self, RunOptions};

use crate::output::{OutputFormat, print_error, print_outcome, status_line};

/// Rebuild the project, then run a Lua script deciding whether this revision is good
#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Lua test script; assertion failures mark the revision bad
  script: PathBuf,

  /// Lua script run before building, without access to the new build
  pre_script: Option<PathBuf>,

  /// Keep the build intermediate directory
  #[arg(short = 'n', long)]
  no_clean: bool,

  /// Config file (default: bisectrun.lua in the project, if present)
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Project directory (default: current directory)
  #[arg(short = 'C', long, value_name = "DIR")]
  project: Option<PathBuf>,

  /// Destination root for the install layout
  #[arg(short, long, value_name = "DIR")]
  dest: Option<PathBuf>,

  /// Kill the build tool after this long (e.g. 90s, 30m)
  #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
  timeout: Option<Duration>,

  /// Status output format
  #[arg(long, value_enum, default_value_t)]
  format: OutputFormat,

  /// Enable debug logging
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> ExitCode {
  // Usage errors must not look like a bad revision
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      let code = if err.use_stderr() { SKIP_EXIT_CODE } else { 0 };
      let _ = err.print();
      return ExitCode::from(code);
    }
  };

  init_tracing(cli.verbose);

  let format = cli.format;
  let started = Instant::now();
  let outcome = match execute(cli) {
    Ok(outcome) => outcome,
    Err(err) => Outcome::Inconclusive(format!("{err:#}")),
  };
  debug!(status = %status_line(&outcome), elapsed = ?started.elapsed(), "run finished");

  if let Err(err) = print_outcome(&outcome, format, started.elapsed()) {
    print_error(&format!("{err:#}"));
    return ExitCode::from(SKIP_EXIT_CODE);
  }

  ExitCode::from(outcome.exit_code())
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

/// Resolve options from flags and config, then run the pipeline.
///
/// Errors here are harness problems, reported as inconclusive by the caller.
fn execute(cli: Cli) -> Result<Outcome> {
  let project_dir = match cli.project {
    Some(dir) => dir,
    None => std::env::current_dir().context("cannot determine current directory")?,
  };
  let project_dir = dunce::canonicalize(&project_dir)
    .with_context(|| format!("project directory not found: {}", project_dir.display()))?;

  let config = HarnessConfig::load(cli.config.as_deref(), &project_dir)?;
  let mut build = config.build_options(&project_dir);

  build.skip_clean = cli.no_clean;
  if let Some(dest) = &cli.dest {
    build.dest_root = std::path::absolute(dest).with_context(|| format!("cannot resolve '{}'", dest.display()))?;
    if config.build.log.is_none() {
      build.log_file = build.dest_root.join(DEFAULT_LOG_NAME);
    }
  }
  if let Some(timeout) = cli.timeout {
    build.timeout = Some(timeout);
  }

  debug!(project = %project_dir.display(), dest = %build.dest_root.display(), "resolved options");

  let options = RunOptions {
    script: cli.script,
    pre_script: cli.pre_script,
    build,
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  Ok(rt.block_on(runner::run(&options)))
}
