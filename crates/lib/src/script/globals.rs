//! The `bisect` global table and the assertion hooks.
//!
//! Registers:
//! - `bisect.fail(msg)` - signal a verified failure
//! - `bisect.chdir(path)` / `bisect.cwd()` - working directory access
//! - `bisect.platform`, `bisect.os`, `bisect.arch`, `bisect.lua_version`
//! - `bisect.script`, `bisect.dir` - the running script and its directory
//! - `bisect.prefix`, `bisect.site_dir`, `bisect.share_dir` - only after a build
//!
//! The global `assert` is replaced with a version that raises an
//! [`AssertionFailure`] instead of a plain string error.
//!
//! Every failing `assert` counts as a verified failure, including the
//! `assert(io.open(path))` idiom. A script that cannot set itself up should
//! use `error(...)` so the revision is skipped, and may use `bisect.fail` to
//! mark the regression itself explicitly.

use std::path::Path;

use mlua::prelude::*;

use super::types::AssertionFailure;
use crate::platform::Platform;
use crate::site::{SiteLayout, runtime_version};

const DEFAULT_ASSERT_MESSAGE: &str = "assertion failed!";

/// Register the `bisect` table and replace `assert` in the given VM.
pub fn register_globals(lua: &Lua, script: &Path, site: Option<&SiteLayout>) -> LuaResult<()> {
  let bisect = lua.create_table()?;

  let platform = Platform::current().ok_or_else(|| LuaError::external("unsupported platform"))?;
  bisect.set("platform", platform.triple())?;
  bisect.set("os", platform.os.as_str())?;
  bisect.set("arch", platform.arch.as_str())?;
  bisect.set("lua_version", runtime_version(lua)?)?;

  bisect.set("script", script.to_string_lossy().into_owned())?;
  bisect.set(
    "dir",
    script
      .parent()
      .unwrap_or(Path::new(""))
      .to_string_lossy()
      .into_owned(),
  )?;

  if let Some(site) = site {
    bisect.set("prefix", site.prefix.to_string_lossy().into_owned())?;
    bisect.set("site_dir", site.site_dir.to_string_lossy().into_owned())?;
    bisect.set("share_dir", site.share_dir.to_string_lossy().into_owned())?;
  }

  bisect.set(
    "fail",
    lua.create_function(|_, message: Option<LuaValue>| -> LuaResult<()> {
      Err(LuaError::external(AssertionFailure::new(describe(message.as_ref()))))
    })?,
  )?;

  bisect.set(
    "chdir",
    lua.create_function(|_, dir: String| {
      std::env::set_current_dir(&dir)
        .map_err(|e| LuaError::external(format!("cannot change directory to '{}': {}", dir, e)))
    })?,
  )?;

  bisect.set(
    "cwd",
    lua.create_function(|_, ()| {
      let dir = std::env::current_dir().map_err(LuaError::external)?;
      Ok(dir.to_string_lossy().into_owned())
    })?,
  )?;

  lua.globals().set("bisect", bisect)?;
  lua.globals().set("assert", create_assert(lua)?)?;

  Ok(())
}

/// `assert(v [, message])` that returns all arguments when `v` is truthy.
fn create_assert(lua: &Lua) -> LuaResult<LuaFunction> {
  lua.create_function(|_, args: LuaMultiValue| {
    let values: Vec<LuaValue> = args.into_iter().collect();

    let holds = match values.first() {
      None | Some(LuaValue::Nil) | Some(LuaValue::Boolean(false)) => false,
      Some(_) => true,
    };

    if holds {
      return Ok(LuaMultiValue::from_iter(values));
    }

    Err(LuaError::external(AssertionFailure::new(describe(values.get(1)))))
  })
}

fn describe(message: Option<&LuaValue>) -> String {
  match message {
    None | Some(LuaValue::Nil) => DEFAULT_ASSERT_MESSAGE.to_string(),
    Some(value) => value
      .to_string()
      .unwrap_or_else(|_| DEFAULT_ASSERT_MESSAGE.to_string()),
  }
}
