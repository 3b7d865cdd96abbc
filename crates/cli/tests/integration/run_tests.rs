//! Full pipeline runs: pre-script, build, install and main script.

use predicates::prelude::*;

use super::common::TestProject;

#[test]
fn passing_script_exits_0() {
  let project = TestProject::new();
  project.write_file("check.lua", "-- nothing to check\n");

  project
    .bisectrun_cmd()
    .arg("check.lua")
    .assert()
    .code(0)
    .stdout(predicate::str::diff("TEST: success\n"));
}

#[test]
fn assertion_failure_exits_1() {
  let project = TestProject::new();
  project.write_file("check.lua", "assert(false, 'regression in X')\n");

  project
    .bisectrun_cmd()
    .arg("check.lua")
    .assert()
    .code(1)
    .stdout(predicate::str::contains("TEST: failed: regression in X"));
}

#[test]
fn script_error_exits_125() {
  let project = TestProject::new();
  project.write_file("check.lua", "local x = undefined_table.field\n");

  project
    .bisectrun_cmd()
    .arg("check.lua")
    .assert()
    .code(125)
    .stdout(predicate::str::starts_with("TEST: cannot run"));
}

#[test]
fn build_failure_exits_125_without_running_script() {
  let project = TestProject::with_build("echo 'cc: fatal error'; exit 1");
  project.write_file("check.lua", "io.open('script-ran', 'w'):close()\n");

  project
    .bisectrun_cmd()
    .arg("check.lua")
    .assert()
    .code(125)
    .stdout(predicate::str::contains("build failed"));

  assert!(!project.path("script-ran").exists());
  let log = std::fs::read_to_string(project.path("dist/build.log")).unwrap();
  assert!(log.contains("cc: fatal error"));
}

#[test]
fn pre_script_assertion_exits_1_before_build() {
  let project = TestProject::with_build("touch built");
  project.write_file("check.lua", "-- pass\n");
  project.write_file("pre.lua", "assert(1 == 2, 'precondition broken')\n");

  project
    .bisectrun_cmd()
    .arg("check.lua")
    .arg("pre.lua")
    .assert()
    .code(1)
    .stdout(predicate::str::contains("failed: precondition broken"));

  assert!(!project.path("built").exists());
}

#[test]
fn pre_script_error_names_the_stage() {
  let project = TestProject::new();
  project.write_file("check.lua", "-- pass\n");
  project.write_file("pre.lua", "error('no toolchain')\n");

  project
    .bisectrun_cmd()
    .arg("check.lua")
    .arg("pre.lua")
    .assert()
    .code(125)
    .stdout(predicate::str::contains("cannot run: pre-script:"));
}

#[test]
fn script_requires_freshly_installed_module() {
  let project = TestProject::with_build(r#"echo 'return { answer = 42 }' > "$BISECT_SHARE_DIR/deep.lua""#);
  project.write_file(
    "check.lua",
    "local deep = require('deep')\nassert(deep.answer == 42, 'wrong answer')\n",
  );

  project.bisectrun_cmd().arg("check.lua").assert().code(0);
}

#[test]
fn stale_module_from_previous_run_is_gone() {
  let project = TestProject::with_build(r#"echo 'return 1' > "$BISECT_SHARE_DIR/old.lua""#);
  project.write_file("check.lua", "assert(require('old') == 1)\n");
  project.bisectrun_cmd().arg("check.lua").assert().code(0);

  // The next revision no longer installs the module
  project.write_file("bisectrun.lua", r#"return { build = { command = { "true" } } }"#);
  project
    .bisectrun_cmd()
    .arg("check.lua")
    .assert()
    .code(125)
    .stdout(predicate::str::contains("module 'old' not found"));
}

#[test]
fn no_clean_keeps_build_dir() {
  let project = TestProject::new();
  project.write_file("check.lua", "-- pass\n");
  project.write_file("build/obj.o", "x");

  project.bisectrun_cmd().arg("-n").arg("check.lua").assert().code(0);
  assert!(project.path("build/obj.o").exists());

  project.bisectrun_cmd().arg("check.lua").assert().code(0);
  assert!(!project.path("build").exists());
}

#[test]
fn dest_flag_moves_install_and_log() {
  let project = TestProject::with_build(r#"echo 'return true' > "$BISECT_SHARE_DIR/here.lua""#);
  project.write_file("check.lua", "assert(require('here'))\n");

  project
    .bisectrun_cmd()
    .arg("--dest")
    .arg("out")
    .arg("check.lua")
    .assert()
    .code(0);

  assert!(project.path("out/build.log").exists());
  assert!(!project.path("dist").exists());
}

#[test]
fn timeout_flag_kills_slow_build() {
  let project = TestProject::with_build("sleep 30");
  project.write_file("check.lua", "-- pass\n");

  project
    .bisectrun_cmd()
    .arg("--timeout")
    .arg("300ms")
    .arg("check.lua")
    .assert()
    .code(125)
    .stdout(predicate::str::contains("timed out"));
}

#[test]
fn config_env_reaches_build() {
  let project = TestProject::new();
  project.write_file(
    "bisectrun.lua",
    r#"return { build = { command = { "sh", "-c", "test \"$OPT\" = -ggdb" }, env = { OPT = "-ggdb" } } }"#,
  );
  project.write_file("check.lua", "-- pass\n");

  project.bisectrun_cmd().arg("check.lua").assert().code(0);
}

#[test]
fn project_flag_runs_elsewhere() {
  let project = TestProject::with_build("touch built");
  let script = project.write_file("check.lua", "assert(io.open('built'), 'not running in the project')\n");
  let elsewhere = tempfile::TempDir::new().unwrap();

  project
    .bisectrun_cmd()
    .current_dir(elsewhere.path())
    .arg("-C")
    .arg(project.temp.path())
    .arg(&script)
    .assert()
    .code(0);

  assert!(project.path("built").exists());
}
