//! `gcauth provision`: ensure a project service account exists.

use std::process;

use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::credentials::{
  CredentialResolver, CredentialStore, ProjectId, ProvisionOptions, ServiceAccountProvisioner, StdinPrompter,
};
use crate::gcloud::{Ed25519KeypairGenerator, GcloudLoginFlow, GoogleApiClient};

/// Resolve the target project, then ensure its service account and key
/// material exist.
pub(crate) fn handle_provision(cli: &Cli, options: ProvisionOptions, colors: &ColorScheme) {
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
  let keys = Ed25519KeypairGenerator::new();
  let mut prompter = StdinPrompter;
  let mut resolver = CredentialResolver::new(&store, &client, &login, &client, &mut prompter);

  // The project comes from the explicit flag when given; otherwise a full
  // resolution decides it.
  let project = match &ctx.project {
    Some(raw) => match ProjectId::new(raw.clone()) {
      Ok(project) => project,
      Err(err) => super::fail(&err, colors),
    },
    None => match resolver.resolve(&ctx) {
      Ok(resolution) => {
        println!(
          "{} {} {}",
          colors.info("→"),
          colors.info("Using project from"),
          colors.info(resolution.strategy)
        );
        resolution.project.project_id
      }
      Err(err) => super::fail(&err, colors),
    },
  };

  println!(
    "{} {} {}",
    colors.info("→"),
    colors.info("Ensuring service account for project"),
    colors.number(&project)
  );

  let provisioner = ServiceAccountProvisioner::new(&store, &client, &keys);
  let record = match provisioner.ensure(&ctx, &mut resolver, &project, &options) {
    Ok(record) => record,
    Err(err) => super::fail(&err, colors),
  };

  println!("\n{} {}", colors.success("✓"), colors.success("Service account ready"));
  println!("  {}: {}", colors.emphasis("Email"), record.client_email);
  if !record.unique_id.is_empty() {
    println!("  {}: {}", colors.emphasis("Unique ID"), colors.dimmed(&record.unique_id));
  }
  println!(
    "  {}: {}",
    colors.emphasis("Record"),
    colors.path(ctx.paths.service_account_record(&project).display())
  );
  println!(
    "  {}: {}",
    colors.emphasis("Private key"),
    colors.path(record.keypair.private_key.display())
  );
  println!(
    "  {}: {}",
    colors.emphasis("Public key"),
    colors.path(record.keypair.public_key.display())
  );
}
