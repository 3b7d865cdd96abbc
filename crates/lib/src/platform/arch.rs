use std::fmt;

/// CPU architecture variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X86_64,
  Aarch64,
  X86,
  Other,
}

impl Arch {
  /// Detect the current CPU architecture at runtime
  pub fn current() -> Self {
    match std::env::consts::ARCH {
      "x86_64" => Self::X86_64,
      "aarch64" => Self::Aarch64,
      "x86" => Self::X86,
      _ => Self::Other,
    }
  }

  /// Returns the lowercase string identifier for this architecture
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
      Self::X86 => "x86",
      Self::Other => std::env::consts::ARCH,
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
