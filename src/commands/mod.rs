//! CLI subcommand handlers.
//!
//! This module groups the implementations for each `gcauth` subcommand,
//! keeping the top-level entry point lightweight while still allowing the
//! handlers to share the fatal-error boundary.

use std::process;

pub mod completions;
pub mod provision;
pub mod resolve;
pub mod show;
pub mod version;

use crate::color::ColorScheme;
use crate::credentials::AuthError;

/// The single fatal boundary: print a diagnostic naming the failing
/// path/value, then exit with the error's fixed code.
///
/// Library code never exits the process; every fatal condition funnels
/// through here.
pub(crate) fn fail(err: &AuthError, colors: &ColorScheme) -> ! {
  eprintln!("{} {}", colors.error("✗"), colors.error(err));
  process::exit(err.exit_code());
}
