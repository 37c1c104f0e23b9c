//! Command-line interface definitions for gcauth.
//!
//! This module defines the CLI structure using clap derives and dispatches
//! parsed invocations to the command handlers.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::color::ColorScheme;
use crate::commands::completions::{Shell, handle_completions_command};
use crate::commands::provision::handle_provision;
use crate::commands::resolve::handle_resolve;
use crate::commands::show::handle_show;
use crate::commands::version::handle_version_command;
use crate::credentials::{AuthError, CredentialPaths, ProvisionOptions, RunContext};

/// gcauth - Resolve and provision Google Cloud credentials
#[derive(Debug, Parser)]
#[command(
  name = "gcauth",
  version,
  about = "Resolve and provision Google Cloud credentials",
  long_about = "A command-line tool for deciding which Google Cloud identity to act as.\n\
                Resolves credentials from explicit flags, the gcloud config, or Application\n\
                Default Credentials, and can provision a project-scoped service account.",
  styles = get_clap_styles()
)]
pub struct Cli {
  /// Subcommand to execute
  #[command(subcommand)]
  pub command: Command,

  /// Authentication options
  #[command(flatten)]
  pub auth: AuthOptions,

  /// Output options
  #[command(flatten)]
  pub output: OutputOptions,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
  /// Resolve the active credential and project identity
  Resolve,

  /// Show detected credential sources without resolving
  Show,

  /// Ensure a service account with local key material exists
  Provision {
    /// Service-account email (derived from the project when omitted)
    #[arg(long, value_name = "EMAIL")]
    email: Option<String>,

    /// Display name for a newly created account
    #[arg(long, value_name = "NAME")]
    display_name: Option<String>,

    /// Directory for the generated keypair
    #[arg(long, value_name = "DIR")]
    keys_dir: Option<PathBuf>,
  },

  /// Display version and build information
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show only version number
    #[arg(long)]
    short: bool,
  },

  /// Generate shell completion scripts
  Completions {
    /// Target shell for completions
    #[arg(value_enum)]
    shell: Shell,
  },
}

/// Authentication options
#[derive(Debug, Parser)]
pub struct AuthOptions {
  /// Account email to act as (highest priority)
  #[arg(long, env = "GCAUTH_ACCOUNT", value_name = "EMAIL")]
  pub account: Option<String>,

  /// Project id to act on (highest priority)
  #[arg(short = 'p', long, env = "GCAUTH_PROJECT", value_name = "PROJECT_ID")]
  pub project: Option<String>,

  /// Path to a service-account key file
  #[arg(long, value_name = "PATH")]
  pub key_file: Option<PathBuf>,

  /// Consult the gcloud config written by `gcloud init`; a broken config is
  /// then treated as a broken environment
  #[arg(long)]
  pub use_default_login: bool,

  /// Skip cached sources and run the interactive ADC setup first
  #[arg(long)]
  pub setup: bool,
}

/// Output options
#[derive(Debug, Parser)]
pub struct OutputOptions {
  /// Private directory for records and generated keys
  #[arg(long, value_name = "DIR")]
  pub credentials_dir: Option<PathBuf>,

  /// Per-request timeout in seconds for API calls
  #[arg(long, default_value = "30", value_name = "SECONDS")]
  pub timeout: u64,
}

/// Behavior options
#[derive(Debug, Parser)]
pub struct BehaviorOptions {
  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Colorize output
  #[arg(long, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

impl Cli {
  /// Validate CLI arguments
  ///
  /// Returns an error if the CLI configuration is invalid.
  pub fn validate(&self) -> Result<(), String> {
    if self.auth.setup && self.auth.use_default_login {
      return Err("--setup skips cached sources and cannot be combined with --use-default-login".to_string());
    }

    if self.auth.key_file.is_some() && self.auth.account.is_some() {
      return Err("--key-file and --account are mutually exclusive".to_string());
    }

    if self.output.timeout == 0 {
      return Err("--timeout must be at least 1 second".to_string());
    }

    Ok(())
  }

  /// Capture the run context for this invocation.
  ///
  /// This is the single place where environment state (home directory, ADC
  /// override variable) is read; everything downstream works off the
  /// returned snapshot.
  pub fn run_context(&self) -> Result<RunContext, AuthError> {
    let mut paths = CredentialPaths::from_home()?;
    if let Some(dir) = &self.output.credentials_dir {
      paths = paths.with_credentials_root(dir.clone());
    }

    let mut ctx = RunContext::new(paths);
    ctx.account = self.auth.account.clone();
    ctx.project = self.auth.project.clone();
    ctx.key_file = self.auth.key_file.clone();
    ctx.use_default_login = self.auth.use_default_login;
    ctx.force_setup = self.auth.setup;
    Ok(ctx)
  }
}

/// Parse CLI arguments, initialize shared services, and dispatch to the
/// chosen command.
pub fn run() {
  let cli = Cli::parse();

  init_tracing(&cli.behavior);

  // Create color scheme based on user preference
  let colors = ColorScheme::new(cli.behavior.color);

  // Validate CLI arguments
  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    process::exit(4); // Invalid arguments exit code
  }

  match &cli.command {
    Command::Resolve => handle_resolve(&cli, &colors),
    Command::Show => handle_show(&cli, &colors),
    Command::Provision {
      email,
      display_name,
      keys_dir,
    } => {
      let options = ProvisionOptions {
        email: email.clone(),
        display_name: display_name.clone(),
        keys_dir: keys_dir.clone(),
      };
      handle_provision(&cli, options, &colors);
    }
    Command::Version { json, short } => handle_version_command(*json, *short, &colors),
    Command::Completions { shell } => handle_completions_command(*shell),
  }
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Get custom styles for clap help output
fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}

#[cfg(test)]
mod tests {
  use clap::Parser;

  use super::*;

  fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
  }

  #[test]
  fn test_validation_rejects_setup_with_use_default_login() {
    let cli = parse(&["gcauth", "--setup", "--use-default-login", "resolve"]);

    let result = cli.validate();
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("--setup"));
  }

  #[test]
  fn test_validation_rejects_key_file_with_account() {
    let cli = parse(&[
      "gcauth",
      "--key-file",
      "/tmp/key.json",
      "--account",
      "johndoe@gmail.com",
      "resolve",
    ]);

    let result = cli.validate();
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("mutually exclusive"));
  }

  #[test]
  fn test_validation_rejects_zero_timeout() {
    let cli = parse(&["gcauth", "--timeout", "0", "resolve"]);

    let result = cli.validate();
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("--timeout"));
  }

  #[test]
  fn test_validation_accepts_plain_resolve() {
    let cli = parse(&["gcauth", "resolve"]);
    assert!(cli.validate().is_ok());
  }

  #[test]
  fn test_project_short_flag() {
    let cli = parse(&["gcauth", "-p", "weather-454da", "resolve"]);
    assert_eq!(cli.auth.project.as_deref(), Some("weather-454da"));
  }

  #[test]
  fn test_provision_subcommand_options() {
    let cli = parse(&[
      "gcauth",
      "provision",
      "--email",
      "svc-x@demo.iam.gserviceaccount.com",
      "--display-name",
      "demo",
      "--keys-dir",
      "/tmp/keys",
    ]);

    match cli.command {
      Command::Provision {
        email,
        display_name,
        keys_dir,
      } => {
        assert_eq!(email.as_deref(), Some("svc-x@demo.iam.gserviceaccount.com"));
        assert_eq!(display_name.as_deref(), Some("demo"));
        assert_eq!(keys_dir, Some(PathBuf::from("/tmp/keys")));
      }
      other => panic!("expected Provision, got {other:?}"),
    }
  }

  #[test]
  fn test_project_from_env_var() {
    // Env-var fallbacks mirror the flag values.
    unsafe {
      std::env::set_var("GCAUTH_PROJECT", "weather-454da");
    }

    let cli = parse(&["gcauth", "resolve"]);
    assert_eq!(cli.auth.project.as_deref(), Some("weather-454da"));

    unsafe {
      std::env::remove_var("GCAUTH_PROJECT");
    }
  }

  #[test]
  fn test_verbose_and_quiet_conflict() {
    let result = Cli::try_parse_from(["gcauth", "-v", "--quiet", "resolve"]);
    assert!(result.is_err());
  }
}
