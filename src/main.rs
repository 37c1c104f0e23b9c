//! gcauth - Resolve and provision Google Cloud credentials
//!
//! Thin binary entry point; all logic lives in the library crate.

fn main() {
  gcauth::cli::run();
}
