//! Build tool invocation.
//!
//! Runs the configured command as a child process with the build
//! environment applied, sending stdout and stderr to the build log.
//!
//! On unix the tool leads its own process group, so a timeout kills the
//! jobs it started as well (`make -j` workers, compilers).

use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::types::BuildError;

/// Open the build log, truncating it, and write the command header.
fn open_log(log_file: &Path, command: &[String]) -> Result<(File, File), BuildError> {
  let log_err = |source| BuildError::Log {
    path: log_file.to_path_buf(),
    source,
  };

  if let Some(parent) = log_file.parent() {
    std::fs::create_dir_all(parent).map_err(log_err)?;
  }

  let mut file = File::create(log_file).map_err(log_err)?;
  writeln!(file, "$ {}", command.join(" ")).map_err(log_err)?;
  file.flush().map_err(log_err)?;

  let stderr = file.try_clone().map_err(log_err)?;
  Ok((file, stderr))
}

/// Run the build tool and wait for it.
///
/// # Arguments
///
/// * `command` - argv with placeholders already substituted
/// * `env` - variables to set on the child on top of the inherited environment
/// * `cwd` - directory the tool runs in
/// * `log_file` - receives a `$ command` header followed by all tool output
/// * `timeout` - if set, the child is killed once it has run this long
pub async fn run_build_tool(
  command: &[String],
  env: &[(OsString, OsString)],
  cwd: &Path,
  log_file: &Path,
  timeout: Option<Duration>,
) -> Result<(), BuildError> {
  let (program, args) = command.split_first().ok_or(BuildError::EmptyCommand)?;

  info!(cmd = %command.join(" "), cwd = %cwd.display(), "running build tool");

  let (stdout, stderr) = open_log(log_file, command)?;

  let mut cmd = Command::new(program);
  cmd
    .args(args)
    .current_dir(cwd)
    .envs(env.iter().map(|(k, v)| (k, v)))
    .stdin(Stdio::null())
    .stdout(Stdio::from(stdout))
    .stderr(Stdio::from(stderr))
    .kill_on_drop(true);

  #[cfg(unix)]
  cmd.process_group(0);

  let mut child = cmd.spawn().map_err(|source| BuildError::Spawn {
    program: program.clone(),
    source,
  })?;

  debug!(pid = ?child.id(), log = %log_file.display(), "build tool started");

  let status = match timeout {
    Some(limit) => {
      let waited = tokio::time::timeout(limit, child.wait()).await;
      match waited {
        Ok(status) => status.map_err(BuildError::Wait)?,
        Err(_) => {
          warn!(after = ?limit, "build timed out, killing build tool");
          kill_build(&mut child).await;
          return Err(BuildError::TimedOut {
            after: limit,
            log: log_file.to_path_buf(),
          });
        }
      }
    }
    None => child.wait().await.map_err(BuildError::Wait)?,
  };

  if !status.success() {
    debug!(code = ?status.code(), "build tool failed");
    return Err(BuildError::Failed {
      code: status.code(),
      log: log_file.to_path_buf(),
    });
  }

  Ok(())
}

/// Kill the build tool and every process in its group, then reap it.
async fn kill_build(child: &mut Child) {
  #[cfg(unix)]
  {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    if let Some(pid) = child.id() {
      if let Err(err) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        warn!(pid, error = %err, "failed to kill build process group");
      }
    }
  }

  if let Err(err) = child.kill().await {
    warn!(error = %err, "failed to kill build tool");
  }
}
