//! End-to-end tests driving the bisectrun binary against throwaway projects.
//!
//! Build commands are shell snippets, so these only run on unix.

#![cfg(unix)]

mod common;
mod format_tests;
mod native_tests;
mod run_tests;
