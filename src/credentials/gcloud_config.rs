//! Reader for gcloud's own INI-style configuration.
//!
//! `gcloud init` writes `~/.config/gcloud/configurations/config_default`:
//!
//! ```text
//! [core]
//! account = johndoe@gmail.com
//! project = weather-454da
//! ```
//!
//! Only the `[core]` section's `account` and `project` keys are read. The
//! file is owned by the gcloud CLI; this module never writes it. Finding the
//! file broken is treated as a broken environment by the resolver, not as a
//! recoverable miss.

use std::fs;
use std::path::Path;

use super::types::AuthError;

/// The `[core]` values extracted from a gcloud config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcloudConfig {
  /// `account` key, when present and non-empty.
  pub account: Option<String>,
  /// `project` key, when present and non-empty.
  pub project: Option<String>,
  /// Whether a `[core]` section header was seen at all.
  pub core_present: bool,
}

/// Load and parse the gcloud config at `path`.
///
/// # Errors
/// * [`AuthError::ConfigNotFound`] when the file does not exist.
/// * [`AuthError::MalformedConfig`] when a line is neither a section header,
///   a comment, nor a `key = value` pair.
pub fn load(path: &Path) -> Result<GcloudConfig, AuthError> {
  if !path.exists() {
    return Err(AuthError::ConfigNotFound {
      path: path.to_path_buf(),
    });
  }

  let content = fs::read_to_string(path)?;
  parse(&content).map_err(|reason| AuthError::MalformedConfig {
    path: path.to_path_buf(),
    reason,
  })
}

/// Parse INI content, tracking the current section.
fn parse(content: &str) -> Result<GcloudConfig, String> {
  let mut config = GcloudConfig::default();
  let mut in_core = false;

  for (index, raw_line) in content.lines().enumerate() {
    let line = raw_line.trim();

    // Skip blanks and comments
    if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
      continue;
    }

    if let Some(rest) = line.strip_prefix('[') {
      let Some(section) = rest.strip_suffix(']') else {
        return Err(format!("unterminated section header on line {}", index + 1));
      };
      in_core = section.trim() == "core";
      if in_core {
        config.core_present = true;
      }
      continue;
    }

    let Some((key, value)) = line.split_once('=') else {
      return Err(format!("expected `key = value` on line {}", index + 1));
    };

    if !in_core {
      continue;
    }

    let value = value.trim();
    match key.trim() {
      "account" if !value.is_empty() => config.account = Some(value.to_string()),
      "project" if !value.is_empty() => config.project = Some(value.to_string()),
      _ => {
        // Other keys belong to gcloud; ignore them.
      }
    }
  }

  Ok(config)
}
