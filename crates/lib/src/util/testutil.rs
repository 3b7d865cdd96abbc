//! Test utilities for bisectrun-lib.
//!
//! Cross-platform helpers for tests that drive the build tool through a shell.

/// Returns argv running a script through the platform shell.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> Vec<String> {
  vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> Vec<String> {
  vec!["cmd.exe".to_string(), "/C".to_string(), script.to_string()]
}

/// Returns a build command that always succeeds without installing anything.
#[cfg(unix)]
pub fn noop_build() -> Vec<String> {
  vec!["/bin/sh".to_string(), "-c".to_string(), "true".to_string()]
}

#[cfg(windows)]
pub fn noop_build() -> Vec<String> {
  vec!["cmd.exe".to_string(), "/C".to_string(), "exit 0".to_string()]
}
