//! `gcauth resolve`: run the resolution machine and print the result.

use std::process;

use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::credentials::{CredentialResolver, CredentialStore, StdinPrompter};
use crate::gcloud::{GcloudLoginFlow, GoogleApiClient};

/// Resolve the active credential and project identity, then look up the
/// project number with the resolved token.
pub(crate) fn handle_resolve(cli: &Cli, colors: &ColorScheme) {
  let ctx = match cli.run_context() {
    Ok(ctx) => ctx,
    Err(err) => super::fail(&err, colors),
  };

  let client = match GoogleApiClient::new(cli.output.timeout) {
    Ok(client) => client,
    Err(err) => {
      eprintln!("{} {}", colors.error("✗"), colors.error(&err));
      process::exit(1);
    }
  };
  let store = CredentialStore::new();
  let login = GcloudLoginFlow::new();

  let mut resolution = {
    let mut prompter = StdinPrompter;
    let mut resolver = CredentialResolver::new(&store, &client, &login, &client, &mut prompter);
    match resolver.resolve(&ctx) {
      Ok(resolution) => resolution,
      Err(err) => super::fail(&err, colors),
    }
  };

  println!("{} {}", colors.success("✓"), colors.success("Credentials resolved"));
  println!("  {}: {}", colors.emphasis("Strategy"), resolution.strategy);
  println!("  {}: {}", colors.emphasis("Kind"), resolution.credential.kind);
  if let Some(subject) = &resolution.credential.subject_email {
    println!("  {}: {}", colors.emphasis("Account"), subject);
  }
  println!(
    "  {}: {}",
    colors.emphasis("Project"),
    colors.number(&resolution.project.project_id)
  );
  if let Some(expiry) = resolution.credential.expiry {
    println!(
      "  {}: {}",
      colors.emphasis("Token expires"),
      colors.dimmed(expiry.format("%Y-%m-%d %H:%M:%S UTC"))
    );
  }

  // The number lookup is a separate step and uses the freshly resolved
  // token when there is one.
  let mut metadata_client = match GoogleApiClient::new(cli.output.timeout) {
    Ok(client) => client,
    Err(err) => {
      eprintln!("{} {}", colors.error("✗"), colors.error(&err));
      process::exit(1);
    }
  };
  if let Some(token) = &resolution.credential.access_token {
    metadata_client = metadata_client.with_ambient_token(token.clone());
  }

  let mut prompter = StdinPrompter;
  let resolver = CredentialResolver::new(&store, &metadata_client, &login, &metadata_client, &mut prompter);
  match resolver.resolve_project_number(&mut resolution.project) {
    Ok(number) => println!("  {}: {}", colors.emphasis("Project number"), colors.number(number)),
    Err(err) => println!(
      "  {}: {}",
      colors.emphasis("Project number"),
      colors.dimmed(format!("unavailable ({err})"))
    ),
  }
}
