//! Color utilities for terminal output.
//!
//! Provides a single semantic color scheme so every command renders the same
//! message types the same way, honoring the `--color` flag and whether
//! stdout is a terminal.

use owo_colors::OwoColorize;

use crate::cli::ColorOption;

/// Semantic colors for the application.
///
/// Methods are named for the purpose of the text (success, error) rather
/// than the color itself, so call sites stay readable.
pub struct ColorScheme {
  enabled: bool,
}

impl ColorScheme {
  /// Create a color scheme from the user preference and terminal state.
  pub fn new(color_option: ColorOption) -> Self {
    let enabled = match color_option {
      ColorOption::Always => true,
      ColorOption::Never => false,
      ColorOption::Auto => {
        use std::io::IsTerminal;
        std::io::stdout().is_terminal()
      }
    };

    Self { enabled }
  }

  /// Check if colors are enabled.
  #[allow(dead_code)]
  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  /// Style for success messages (green).
  pub fn success<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.green())
    } else {
      text.to_string()
    }
  }

  /// Style for error messages (bright red).
  pub fn error<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.bright_red().bold())
    } else {
      text.to_string()
    }
  }

  /// Style for warning messages (yellow).
  pub fn warning<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.yellow())
    } else {
      text.to_string()
    }
  }

  /// Style for info messages (cyan).
  pub fn info<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.cyan())
    } else {
      text.to_string()
    }
  }

  /// Style for emphasis/important text (bright white, bold).
  pub fn emphasis<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.bright_white().bold())
    } else {
      text.to_string()
    }
  }

  /// Style for file paths (magenta).
  pub fn path<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.magenta())
    } else {
      text.to_string()
    }
  }

  /// Style for identifiers and numbers (bright blue).
  pub fn number<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.bright_blue())
    } else {
      text.to_string()
    }
  }

  /// Style for dimmed/secondary text (gray).
  pub fn dimmed<T: std::fmt::Display>(&self, text: T) -> String {
    if self.enabled {
      format!("{}", text.dimmed())
    } else {
      text.to_string()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_color_scheme_disabled() {
    let scheme = ColorScheme::new(ColorOption::Never);
    assert!(!scheme.is_enabled());
    assert_eq!(scheme.success("test"), "test");
    assert_eq!(scheme.error("test"), "test");
  }

  #[test]
  fn test_color_scheme_enabled() {
    let scheme = ColorScheme::new(ColorOption::Always);
    assert!(scheme.is_enabled());
    assert_ne!(scheme.success("test"), "test");
    assert_ne!(scheme.error("test"), "test");
  }

  #[test]
  fn test_all_semantic_colors_produce_output() {
    let scheme = ColorScheme::new(ColorOption::Always);
    let text = "test";

    assert!(!scheme.success(text).is_empty());
    assert!(!scheme.error(text).is_empty());
    assert!(!scheme.warning(text).is_empty());
    assert!(!scheme.info(text).is_empty());
    assert!(!scheme.emphasis(text).is_empty());
    assert!(!scheme.path(text).is_empty());
    assert!(!scheme.number(text).is_empty());
    assert!(!scheme.dimmed(text).is_empty());
  }
}
