//! `gcauth show`: print the detected credential sources.
//!
//! Surfaces where each value would come from (CLI flags, environment
//! variables, the gcloud config, the ADC file, the token cache) so users can
//! diagnose conflicts without running a resolution.

use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::credentials::context::ADC_OVERRIDE_ENV;
use crate::credentials::{CredentialStore, TokenCache, gcloud_config};
use crate::credentials::types::AuthError;

/// Display the currently configured credential sources and values.
pub(crate) fn handle_show(cli: &Cli, colors: &ColorScheme) {
  let ctx = match cli.run_context() {
    Ok(ctx) => ctx,
    Err(err) => super::fail(&err, colors),
  };
  let store = CredentialStore::new();

  println!("{}\n", colors.emphasis("Credential Sources"));

  // Explicit overrides
  let account_source = if std::env::var("GCAUTH_ACCOUNT").is_ok() {
    "environment variable"
  } else if cli.auth.account.is_some() {
    "command-line flag"
  } else {
    "not set"
  };
  if let Some(account) = &ctx.account {
    println!("{}: {}", colors.emphasis("Account"), account);
    println!("  {}: {}", colors.dimmed("Source"), colors.dimmed(account_source));
  } else {
    println!("{}: {}", colors.emphasis("Account"), colors.dimmed("(not set)"));
  }

  let project_source = if std::env::var("GCAUTH_PROJECT").is_ok() {
    "environment variable"
  } else if cli.auth.project.is_some() {
    "command-line flag"
  } else {
    "not set"
  };
  if let Some(project) = &ctx.project {
    println!("{}: {}", colors.emphasis("Project"), colors.number(project));
    println!("  {}: {}", colors.dimmed("Source"), colors.dimmed(project_source));
  } else {
    println!("{}: {}", colors.emphasis("Project"), colors.dimmed("(not set)"));
  }

  if let Some(key_file) = &ctx.key_file {
    println!("{}: {}", colors.emphasis("Key file"), colors.path(key_file.display()));
    if !store.validate_credential_file(key_file) {
      println!(
        "  {} {}",
        colors.warning("⚠"),
        colors.warning("not a structurally valid service-account key file")
      );
    }
  }

  // gcloud config
  println!(
    "\n{}: {}",
    colors.emphasis("gcloud config"),
    colors.path(ctx.paths.gcloud_config.display())
  );
  match gcloud_config::load(&ctx.paths.gcloud_config) {
    Ok(config) => {
      println!(
        "  {}: {}",
        colors.dimmed("account"),
        config.account.as_deref().unwrap_or("(none)")
      );
      println!(
        "  {}: {}",
        colors.dimmed("project"),
        config.project.as_deref().unwrap_or("(none)")
      );
    }
    Err(AuthError::ConfigNotFound { .. }) => {
      println!("  {}", colors.dimmed("(not found)"));
    }
    Err(err) => {
      println!("  {} {}", colors.warning("⚠"), colors.warning(err));
    }
  }

  // Application Default Credentials
  if let Some(path) = &ctx.adc_override {
    println!(
      "\n{}: {}",
      colors.emphasis("ADC override"),
      colors.path(path.display())
    );
    println!(
      "  {}: {}",
      colors.dimmed("Source"),
      colors.dimmed(format!("{ADC_OVERRIDE_ENV} environment variable"))
    );
  }
  println!(
    "\n{}: {}",
    colors.emphasis("ADC file"),
    colors.path(ctx.paths.adc_file.display())
  );
  match store.load_adc(&ctx.paths.adc_file) {
    Ok(adc) => {
      println!(
        "  {}: {}",
        colors.dimmed("type"),
        adc.credential_type.as_deref().unwrap_or("(unknown)")
      );
      println!(
        "  {}: {}",
        colors.dimmed("quota project"),
        adc.quota_project_id.as_deref().unwrap_or("(none)")
      );
    }
    Err(AuthError::ConfigNotFound { .. }) => {
      println!("  {}", colors.dimmed("(not found)"));
      println!(
        "  {}",
        colors.dimmed("run `gcauth resolve --setup` to create it")
      );
    }
    Err(err) => {
      println!("  {} {}", colors.warning("⚠"), colors.warning(err));
    }
  }

  // Cached user token
  println!(
    "\n{}: {}",
    colors.emphasis("Token cache"),
    colors.path(ctx.paths.token_cache.display())
  );
  match store.load_cached_auth_token(&ctx.paths.token_cache) {
    Ok(TokenCache::Missing) => println!("  {}", colors.dimmed("(not found)")),
    Ok(TokenCache::Valid(token)) => {
      if let Some(account) = &token.account {
        println!("  {}: {}", colors.dimmed("account"), account);
      }
      if let Some(access_token) = &token.access_token {
        println!("  {}: {}", colors.dimmed("token"), colors.dimmed(mask_token(access_token)));
      }
      println!("  {} {}", colors.success("✓"), colors.success("valid"));
    }
    Ok(TokenCache::Refreshable(_)) => {
      println!(
        "  {} {}",
        colors.warning("⚠"),
        colors.warning("expired; a refresh token is available")
      );
    }
    Ok(TokenCache::Invalid) => {
      println!(
        "  {} {}",
        colors.warning("⚠"),
        colors.warning("expired; re-authentication required")
      );
    }
    Err(err) => {
      println!("  {} {}", colors.warning("⚠"), colors.warning(err));
    }
  }

  // Summary
  let has_any_source = ctx.account.is_some()
    || ctx.project.is_some()
    || ctx.key_file.is_some()
    || ctx.adc_override.is_some()
    || ctx.paths.gcloud_config.exists()
    || ctx.paths.adc_file.exists();
  if has_any_source {
    println!("\n{} {}", colors.success("✓"), colors.success("Credential sources detected"));
  } else {
    println!(
      "\n{} {}",
      colors.warning("⚠"),
      colors.warning("No credential sources configured")
    );
    println!("  Provide --account/--project, a --key-file, or run `gcauth resolve --setup`");
  }
}

/// Mask a token for display, keeping only a short recognizable prefix.
fn mask_token(token: &str) -> String {
  if token.len() > 8 {
    format!("{}{}", &token[..4], "*".repeat(token.len() - 4))
  } else {
    "*".repeat(token.len())
  }
}
