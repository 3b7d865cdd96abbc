//! Export the embedded Lua API from the `bisectrun` binary.
//!
//! Lua C modules are built without linking liblua and resolve `lua_*`
//! symbols from the host process when `require` loads them. The interpreter
//! is linked statically, so the binary has to export those symbols itself.

fn main() {
  println!("cargo:rerun-if-changed=build.rs");

  let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
  match target_os.as_str() {
    "linux" | "freebsd" | "netbsd" | "openbsd" | "dragonfly" | "android" => {
      println!("cargo:rustc-link-arg-bins=-rdynamic");
    }
    "macos" | "ios" => {
      println!("cargo:rustc-link-arg-bins=-Wl,-export_dynamic");
    }
    _ => {}
  }
}
