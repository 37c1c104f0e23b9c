//! Build script for the gcauth project
//!
//! Embeds version and build metadata for runtime access

use std::env;
use std::process::Command;

fn main() {
  embed_build_info();
  set_rerun_conditions();
}

/// Embeds build-time information as environment variables accessible at
/// runtime: git commit hash, build timestamp, target triple, and rustc
/// version, all surfaced by `gcauth version`.
fn embed_build_info() {
  // Commit hash, falling back gracefully outside a git checkout
  if let Ok(output) = Command::new("git").args(["rev-parse", "--short", "HEAD"]).output() {
    let git_hash = String::from_utf8(output.stdout).unwrap_or_default().trim().to_string();
    println!("cargo:rustc-env=GIT_HASH={git_hash}");
  } else {
    println!("cargo:rustc-env=GIT_HASH=unknown");
  }

  // Build time as a Unix timestamp
  println!(
    "cargo:rustc-env=BUILD_TIMESTAMP={}",
    std::time::SystemTime::now()
      .duration_since(std::time::UNIX_EPOCH)
      .map(|d| d.as_secs())
      .unwrap_or_default()
  );

  // Target triple, also used in the HTTP user agent
  println!("cargo:rustc-env=TARGET={}", env::var("TARGET").unwrap_or_default());

  // Compiler version
  if let Ok(output) = Command::new("rustc").args(["--version"]).output() {
    let rustc_version = String::from_utf8(output.stdout).unwrap_or_default().trim().to_string();
    println!("cargo:rustc-env=RUSTC_VERSION={rustc_version}");
  } else {
    println!("cargo:rustc-env=RUSTC_VERSION=unknown");
  }
}

/// Configures conditions that trigger build script re-execution.
fn set_rerun_conditions() {
  println!("cargo:rerun-if-changed=build.rs");
  println!("cargo:rerun-if-changed=.git/HEAD");
  println!("cargo:rerun-if-env-changed=TARGET");
}
