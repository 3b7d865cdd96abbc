//! bisectrun-lib: build, isolate, run and classify one revision.
//!
//! This crate provides the pieces behind the `bisectrun` harness:
//! - `build`: clean rebuild-and-install into a private destination root
//! - `site`: the install layout and module search path wiring
//! - `script`: Lua test script execution with assertion detection
//! - `runner`: the staged pipeline producing an `Outcome`
//! - `outcome`: the exit code protocol understood by `git bisect run`

pub mod build;
pub mod config;
pub mod consts;
pub mod outcome;
pub mod placeholder;
pub mod platform;
pub mod runner;
pub mod script;
pub mod site;
pub mod util;
