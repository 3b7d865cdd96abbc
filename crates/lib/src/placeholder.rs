//! Placeholder parsing and substitution for build command arguments.
//!
//! The build command is configured before the destination layout is known,
//! so its arguments may reference layout paths that are filled in right
//! before the build tool is spawned.
//!
//! # Placeholder Formats
//!
//! - `$${prefix}` - the platform install prefix (`<dest>/<os>`)
//! - `$${dest}` - the destination root
//! - `$${site}` - the native module directory
//! - `$${share}` - the pure-Lua module directory
//! - `$${lua_version}` - the runtime version (e.g. `5.4`)
//! - `$${project}` - the project directory the build runs in
//!
//! # Shell Variables
//!
//! Single `$` characters pass through unchanged, so `$HOME` in a
//! `sh -c` argument still reaches the shell.
//!
//! # Escaping
//!
//! Use `$$$` before `{` to produce a literal `$${` sequence.
//!
//! # Example
//!
//! ```
//! use bisectrun_lib::placeholder::{parse, Segment, Placeholder};
//!
//! let segments = parse("PREFIX=$${prefix}").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Literal("PREFIX=".to_string()),
//!     Segment::Placeholder(Placeholder::Prefix),
//! ]);
//! ```

use thiserror::Error;

/// A parsed placeholder reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
  /// `$${prefix}`
  Prefix,
  /// `$${dest}`
  Dest,
  /// `$${site}`
  Site,
  /// `$${share}`
  Share,
  /// `$${lua_version}`
  LuaVersion,
  /// `$${project}`
  Project,
}

impl Placeholder {
  /// The name written between the braces.
  pub fn name(&self) -> &'static str {
    match self {
      Placeholder::Prefix => "prefix",
      Placeholder::Dest => "dest",
      Placeholder::Site => "site",
      Placeholder::Share => "share",
      Placeholder::LuaVersion => "lua_version",
      Placeholder::Project => "project",
    }
  }
}

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text (no placeholders)
  Literal(String),

  /// A placeholder to be resolved
  Placeholder(Placeholder),
}

/// Errors that can occur during placeholder parsing or resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
  #[error("unclosed placeholder at position {0}")]
  Unclosed(usize),

  #[error("unknown placeholder: {0}")]
  Unknown(String),

  #[error("unresolved placeholder: {0}")]
  Unresolved(&'static str),
}

/// Supplies values for placeholders at substitution time.
pub trait Resolver {
  fn resolve(&self, placeholder: Placeholder) -> Result<&str, PlaceholderError>;
}

/// Parse a string containing placeholders into segments.
///
/// # Errors
///
/// Returns an error if a placeholder is unclosed or names an unknown value.
pub fn parse(input: &str) -> Result<Vec<Segment>, PlaceholderError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    match chars.peek() {
      Some((_, '$')) => {
        chars.next(); // consume the second $

        match chars.peek() {
          Some((_, '$')) => {
            chars.next(); // consume the third $

            match chars.peek() {
              Some((_, '{')) => {
                // Escaped: $$${ -> $${ (literal)
                literal.push_str("$${");
                chars.next();
              }
              _ => literal.push_str("$$$"),
            }
          }
          Some((_, '{')) => {
            chars.next(); // consume the {

            if !literal.is_empty() {
              segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }

            let mut name = String::new();
            let mut found_close = false;
            for (_, c) in chars.by_ref() {
              if c == '}' {
                found_close = true;
                break;
              }
              name.push(c);
            }

            if !found_close {
              return Err(PlaceholderError::Unclosed(pos));
            }

            segments.push(Segment::Placeholder(parse_placeholder_name(&name)?));
          }
          _ => literal.push_str("$$"),
        }
      }
      // A lone $ is literal so shell variables pass through
      _ => literal.push('$'),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

fn parse_placeholder_name(name: &str) -> Result<Placeholder, PlaceholderError> {
  match name.trim() {
    "prefix" => Ok(Placeholder::Prefix),
    "dest" => Ok(Placeholder::Dest),
    "site" => Ok(Placeholder::Site),
    "share" => Ok(Placeholder::Share),
    "lua_version" => Ok(Placeholder::LuaVersion),
    "project" => Ok(Placeholder::Project),
    other => Err(PlaceholderError::Unknown(other.to_string())),
  }
}

/// Substitute all placeholders in a string using the provided resolver.
///
/// # Errors
///
/// Returns an error if parsing fails or if any placeholder cannot be resolved.
pub fn substitute(input: &str, resolver: &impl Resolver) -> Result<String, PlaceholderError> {
  let segments = parse(input)?;
  substitute_segments(&segments, resolver)
}

/// Substitute placeholders in pre-parsed segments.
pub fn substitute_segments(segments: &[Segment], resolver: &impl Resolver) -> Result<String, PlaceholderError> {
  let mut result = String::new();

  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Placeholder(p) => result.push_str(resolver.resolve(*p)?),
    }
  }

  Ok(result)
}
