//! CLI output formatting.
//!
//! The status line is the only thing written to stdout in text mode, so
//! wrapper scripts can grep for it. Everything else goes to stderr.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use bisectrun_lib::consts::STATUS_PREFIX;
use bisectrun_lib::outcome::Outcome;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const ERROR: &str = "✗";
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

/// `TEST: <label>[: <detail>]` without colors.
pub fn status_line(outcome: &Outcome) -> String {
  format!("{STATUS_PREFIX} {outcome}")
}

fn colored_label(outcome: &Outcome) -> String {
  let label = outcome.label();
  match outcome {
    Outcome::Success => label.if_supports_color(Stream::Stdout, |s| s.green()).to_string(),
    Outcome::VerifiedFailure(_) => label.if_supports_color(Stream::Stdout, |s| s.red()).to_string(),
    Outcome::Inconclusive(_) => label.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string(),
  }
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Report the outcome of a run in the requested format.
pub fn print_outcome(outcome: &Outcome, format: OutputFormat, elapsed: Duration) -> anyhow::Result<()> {
  if format.is_json() {
    let mut value = serde_json::to_value(outcome).context("Failed to serialize outcome")?;
    if let Some(map) = value.as_object_mut() {
      map.insert("exit_code".into(), outcome.exit_code().into());
      map.insert("elapsed".into(), format_duration(elapsed).into());
    }
    return print_json(&value);
  }

  match outcome.detail() {
    Some(detail) => println!("{STATUS_PREFIX} {}: {}", colored_label(outcome), detail),
    None => println!("{STATUS_PREFIX} {}", colored_label(outcome)),
  }
  Ok(())
}
