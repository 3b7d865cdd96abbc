use std::path::Path;

use mlua::prelude::*;

use super::globals;
use crate::site::SiteLayout;

/// Create the VM a single script runs in.
///
/// The full standard library is loaded and C modules may be required, since
/// the point of the main script is to load the freshly built native module.
/// When `site` is given its directories are searched before anything else.
pub fn create_runtime(script: &Path, site: Option<&SiteLayout>) -> LuaResult<Lua> {
  // SAFETY: scripts are trusted and must be able to load native modules,
  // which the safe constructor forbids.
  let lua = unsafe { Lua::unsafe_new() };

  if let Some(site) = site {
    site.install(&lua)?;
  }

  globals::register_globals(&lua, script, site)?;

  Ok(lua)
}

/// Load and execute a Lua file, discarding its return values.
pub fn exec_file(lua: &Lua, path: &Path, source: Vec<u8>) -> LuaResult<()> {
  lua
    .load(strip_shebang(source))
    .set_name(format!("@{}", path.display()))
    .exec()
}

/// Blank out a leading `#!` line, keeping line numbers intact.
fn strip_shebang(mut source: Vec<u8>) -> Vec<u8> {
  if source.starts_with(b"#") {
    let end = source.iter().position(|&b| b == b'\n').unwrap_or(source.len());
    source.drain(..end);
  }
  source
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn native_loaders_are_available() -> LuaResult<()> {
    let lua = create_runtime(Path::new("/tmp/check.lua"), None)?;
    let has_loadlib: bool = lua.load("return type(package.loadlib) == 'function'").eval()?;
    assert!(has_loadlib);
    Ok(())
  }

  #[test]
  fn shebang_line_is_ignored() -> LuaResult<()> {
    let lua = create_runtime(Path::new("/tmp/check.lua"), None)?;
    exec_file(&lua, Path::new("/tmp/check.lua"), b"#!/usr/bin/env lua\nx = 1\n".to_vec())?;
    let x: i64 = lua.globals().get("x")?;
    assert_eq!(x, 1);
    Ok(())
  }

  #[test]
  fn shebang_keeps_line_numbers() {
    let source = strip_shebang(b"#!/bin/lua\nerror('x')".to_vec());
    assert_eq!(source, b"\nerror('x')");
  }
}
