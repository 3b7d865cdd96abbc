//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Throwaway project directory.
///
/// The build command is a shell snippet written into `bisectrun.lua`, so
/// tests can install modules or fail the build without a real toolchain.
pub struct TestProject {
  pub temp: TempDir,
}

impl TestProject {
  /// Project whose build does nothing.
  pub fn new() -> Self {
    Self::with_build("true")
  }

  /// Project whose build runs `script` with `sh -c`.
  pub fn with_build(script: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let project = Self { temp };
    project.write_file(
      "bisectrun.lua",
      &format!("return {{ build = {{ command = {{ \"sh\", \"-c\", [==[{script}]==] }} }} }}\n"),
    );
    project
  }

  /// Write a file relative to the project directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  /// Command for the bisectrun binary running inside the project.
  pub fn bisectrun_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("bisectrun");
    cmd.current_dir(self.temp.path());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
