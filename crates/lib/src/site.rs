//! Install layout under the destination root and module search path wiring.
//!
//! A build installs into `<dest>/<os>`, with native modules under
//! `lib/lua/<ver>` and pure-Lua modules under `share/lua/<ver>`. The paths
//! are always derived here so the harness and the build tool agree on them.

use std::path::{Path, PathBuf};

use mlua::prelude::*;
use tracing::debug;

use crate::placeholder::{Placeholder, PlaceholderError, Resolver};
use crate::platform::Platform;

/// Read the `major.minor` runtime version from a VM's `_VERSION` global.
pub fn runtime_version(lua: &Lua) -> LuaResult<String> {
  let version: String = lua.globals().get("_VERSION")?;
  Ok(version.trim_start_matches("Lua ").trim().to_string())
}

/// The runtime version of the embedded interpreter.
pub fn host_runtime_version() -> LuaResult<String> {
  runtime_version(&Lua::new())
}

/// Where a build installs its importable artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
  pub dest_root: PathBuf,
  pub prefix: PathBuf,
  /// Native module directory, searched through `package.cpath`.
  pub site_dir: PathBuf,
  /// Pure-Lua module directory, searched through `package.path`.
  pub share_dir: PathBuf,
  pub lua_version: String,
  pub module_suffix: &'static str,
}

impl SiteLayout {
  pub fn new(dest_root: &Path, platform: Platform, lua_version: &str) -> Self {
    let prefix = dest_root.join(platform.os.as_str());
    let site_dir = prefix.join("lib").join("lua").join(lua_version);
    let share_dir = prefix.join("share").join("lua").join(lua_version);

    Self {
      dest_root: dest_root.to_path_buf(),
      prefix,
      site_dir,
      share_dir,
      lua_version: lua_version.to_string(),
      module_suffix: platform.os.module_suffix(),
    }
  }

  /// `package.cpath` entries contributed by this layout.
  pub fn cpath_entries(&self) -> Vec<String> {
    vec![format!("{}/?.{}", lua_path(&self.site_dir), self.module_suffix)]
  }

  /// `package.path` entries contributed by this layout.
  pub fn path_entries(&self) -> Vec<String> {
    let share = lua_path(&self.share_dir);
    vec![format!("{share}/?.lua"), format!("{share}/?/init.lua")]
  }

  /// Make this layout the first place `require` looks in the given VM.
  ///
  /// Only the passed VM is affected. Entries already at the front are not
  /// added again.
  pub fn install(&self, lua: &Lua) -> LuaResult<()> {
    let package: LuaTable = lua.globals().get("package")?;

    for (key, entries) in [("cpath", self.cpath_entries()), ("path", self.path_entries())] {
      let current: String = package.get(key)?;
      let updated = prepend_entries(&current, &entries);
      debug!(key, value = %updated, "module search path");
      package.set(key, updated)?;
    }

    Ok(())
  }
}

fn lua_path(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}

fn prepend_entries(current: &str, entries: &[String]) -> String {
  let rest: Vec<&str> = current
    .split(';')
    .filter(|existing| !existing.is_empty() && !entries.iter().any(|e| e == existing))
    .collect();

  entries
    .iter()
    .map(String::as_str)
    .chain(rest)
    .collect::<Vec<_>>()
    .join(";")
}

/// Resolves build command placeholders from a layout and project directory.
pub struct LayoutResolver {
  prefix: String,
  dest: String,
  site: String,
  share: String,
  lua_version: String,
  project: String,
}

impl LayoutResolver {
  pub fn new(layout: &SiteLayout, project_dir: &Path) -> Self {
    Self {
      prefix: lua_path(&layout.prefix),
      dest: lua_path(&layout.dest_root),
      site: lua_path(&layout.site_dir),
      share: lua_path(&layout.share_dir),
      lua_version: layout.lua_version.clone(),
      project: lua_path(project_dir),
    }
  }
}

impl Resolver for LayoutResolver {
  fn resolve(&self, placeholder: Placeholder) -> Result<&str, PlaceholderError> {
    Ok(match placeholder {
      Placeholder::Prefix => &self.prefix,
      Placeholder::Dest => &self.dest,
      Placeholder::Site => &self.site,
      Placeholder::Share => &self.share,
      Placeholder::LuaVersion => &self.lua_version,
      Placeholder::Project => &self.project,
    })
  }
}
