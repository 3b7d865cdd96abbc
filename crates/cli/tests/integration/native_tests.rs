//! Native (C) modules built by the project and loaded by the test script.

use predicates::prelude::*;

use super::common::TestProject;

/// A Lua C module declaring only the API it uses, so no headers are needed.
const ANSWER_C: &str = r#"
typedef struct lua_State lua_State;
extern void lua_createtable(lua_State *L, int narr, int nrec);
extern void lua_pushinteger(lua_State *L, long long n);
extern void lua_setfield(lua_State *L, int idx, const char *k);

int luaopen_answer(lua_State *L) {
  lua_createtable(L, 0, 1);
  lua_pushinteger(L, 42);
  lua_setfield(L, -2, "value");
  return 1;
}
"#;

/// Compiles `answer.c` into the native module directory without linking liblua.
const BUILD_ANSWER: &str = r#"case "$(uname)" in
  Darwin) flags="-bundle -undefined dynamic_lookup" ;;
  *) flags="-shared -fPIC" ;;
esac
cc $flags -o "$BISECT_SITE_DIR/answer.so" answer.c"#;

fn have_cc() -> bool {
  std::process::Command::new("cc")
    .arg("--version")
    .output()
    .map(|out| out.status.success())
    .unwrap_or(false)
}

#[test]
fn script_requires_freshly_built_native_module() {
  if !have_cc() {
    eprintln!("skipping: no C compiler");
    return;
  }

  let project = TestProject::with_build(BUILD_ANSWER);
  project.write_file("answer.c", ANSWER_C);
  project.write_file(
    "check.lua",
    "local answer = require('answer')\nassert(answer.value == 42, 'wrong answer ' .. tostring(answer.value))\n",
  );

  project
    .bisectrun_cmd()
    .arg("check.lua")
    .assert()
    .code(0)
    .stdout(predicate::str::diff("TEST: success\n"));

  assert!(project.path("dist/build.log").exists());
}

#[test]
fn native_module_result_decides_the_revision() {
  if !have_cc() {
    eprintln!("skipping: no C compiler");
    return;
  }

  let project = TestProject::with_build(BUILD_ANSWER);
  project.write_file("answer.c", &ANSWER_C.replace("42", "41"));
  project.write_file("check.lua", "assert(require('answer').value == 42, 'off by one')\n");

  project
    .bisectrun_cmd()
    .arg("check.lua")
    .assert()
    .code(1)
    .stdout(predicate::str::contains("TEST: failed: off by one"));
}
