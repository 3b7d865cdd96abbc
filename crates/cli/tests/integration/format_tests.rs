//! `--format json` output.

use super::common::TestProject;

fn run_json(project: &TestProject) -> (i32, serde_json::Value) {
  let output = project
    .bisectrun_cmd()
    .arg("--format")
    .arg("json")
    .arg("check.lua")
    .output()
    .unwrap();
  let value = serde_json::from_slice(&output.stdout).unwrap();
  (output.status.code().unwrap(), value)
}

#[test]
fn success_as_json() {
  let project = TestProject::new();
  project.write_file("check.lua", "-- pass\n");

  let (code, value) = run_json(&project);

  assert_eq!(code, 0);
  assert_eq!(value["outcome"], "success");
  assert_eq!(value["exit_code"], 0);
  assert!(value["elapsed"].is_string());
}

#[test]
fn failure_as_json() {
  let project = TestProject::new();
  project.write_file("check.lua", "bisect.fail('value was 3')\n");

  let (code, value) = run_json(&project);

  assert_eq!(code, 1);
  assert_eq!(value["outcome"], "verified_failure");
  assert_eq!(value["detail"], "value was 3");
  assert_eq!(value["exit_code"], 1);
}

#[test]
fn build_failure_as_json() {
  let project = TestProject::with_build("exit 4");
  project.write_file("check.lua", "-- pass\n");

  let (code, value) = run_json(&project);

  assert_eq!(code, 125);
  assert_eq!(value["outcome"], "inconclusive");
  assert!(value["detail"].as_str().unwrap().contains("build failed"));
}
