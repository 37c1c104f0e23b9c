//! Per-invocation context and well-known credential file locations.
//!
//! Everything the resolution machine needs from the environment is captured
//! here exactly once at startup. No component downstream of the CLI layer
//! reads environment variables or other ambient process state for identity
//! decisions.

use std::path::{Path, PathBuf};

use chrono::Utc;

use super::types::{AuthError, ProjectId};

/// Name of the environment variable pointing at an explicit ADC file.
pub const ADC_OVERRIDE_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Well-known credential file locations for a single run.
///
/// The gcloud config and ADC files are owned by the gcloud CLI and only
/// read; everything under `credentials_root` is owned by this tool.
#[derive(Debug, Clone)]
pub struct CredentialPaths {
  /// gcloud's INI config written by `gcloud init`.
  pub gcloud_config: PathBuf,
  /// Application Default Credentials file written by
  /// `gcloud auth application-default login`.
  pub adc_file: PathBuf,
  /// Cached user OAuth token owned by this tool.
  pub token_cache: PathBuf,
  /// Private root for service-account records and generated keys.
  pub credentials_root: PathBuf,
}

impl CredentialPaths {
  /// Derive the default locations from the user's home directory.
  ///
  /// # Errors
  /// Returns an error when `HOME` is unset, since every path hangs off it.
  pub fn from_home() -> Result<Self, AuthError> {
    let home = std::env::var("HOME").map_err(|_| {
      AuthError::MalformedConfig {
        path: PathBuf::from("$HOME"),
        reason: "HOME environment variable is not set".to_string(),
      }
    })?;
    Ok(Self::under(Path::new(&home)))
  }

  /// Derive all locations from an explicit home directory.
  ///
  /// Used by tests to point the whole machine at a temp directory.
  pub fn under(home: &Path) -> Self {
    let gcloud = home.join(".config").join("gcloud");
    let root = home.join(".gcauth");
    Self {
      gcloud_config: gcloud.join("configurations").join("config_default"),
      adc_file: gcloud.join("application_default_credentials.json"),
      token_cache: root.join("token_cache.json"),
      credentials_root: root,
    }
  }

  /// Replace the private credentials root (and the token cache under it).
  pub fn with_credentials_root(mut self, root: PathBuf) -> Self {
    self.token_cache = root.join("token_cache.json");
    self.credentials_root = root;
    self
  }

  /// Location of the persisted service-account record for a project.
  pub fn service_account_record(&self, project: &ProjectId) -> PathBuf {
    self
      .credentials_root
      .join(project.as_str())
      .join("service-account.json")
  }

  /// Default directory for a project's generated keypair files.
  pub fn keys_dir(&self, project: &ProjectId) -> PathBuf {
    self.credentials_root.join(project.as_str()).join("keys")
  }
}

/// Immutable snapshot of everything identity-related for one invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
  /// Account email supplied via `--account`.
  pub account: Option<String>,
  /// Project id supplied via `--project` (validated at use).
  pub project: Option<String>,
  /// Service-account key file supplied via `--key-file`.
  pub key_file: Option<PathBuf>,
  /// Consult the gcloud config (strategy 2); defects there become fatal.
  pub use_default_login: bool,
  /// Skip cached sources and run the interactive ADC setup first.
  pub force_setup: bool,
  /// ADC override path captured from `GOOGLE_APPLICATION_CREDENTIALS`.
  pub adc_override: Option<PathBuf>,
  /// Whether standard input is a terminal; gates the prompt fallback.
  pub interactive: bool,
  /// Run-scoped seed for deterministic service-account naming.
  pub timestamp_seed: i64,
  /// Where credential files live for this run.
  pub paths: CredentialPaths,
}

impl RunContext {
  /// Build a context with no CLI overrides, capturing the ADC override
  /// environment variable, the terminal state, and the timestamp seed now.
  pub fn new(paths: CredentialPaths) -> Self {
    use std::io::IsTerminal;

    Self {
      account: None,
      project: None,
      key_file: None,
      use_default_login: false,
      force_setup: false,
      adc_override: std::env::var_os(ADC_OVERRIDE_ENV).map(PathBuf::from),
      interactive: std::io::stdin().is_terminal(),
      timestamp_seed: Utc::now().timestamp(),
      paths,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_paths_hang_off_home() {
    let paths = CredentialPaths::under(Path::new("/home/demo"));
    assert_eq!(
      paths.gcloud_config,
      PathBuf::from("/home/demo/.config/gcloud/configurations/config_default")
    );
    assert_eq!(
      paths.adc_file,
      PathBuf::from("/home/demo/.config/gcloud/application_default_credentials.json")
    );
    assert_eq!(paths.credentials_root, PathBuf::from("/home/demo/.gcauth"));
    assert_eq!(paths.token_cache, PathBuf::from("/home/demo/.gcauth/token_cache.json"));
  }

  #[test]
  fn test_credentials_root_override_moves_token_cache() {
    let paths = CredentialPaths::under(Path::new("/home/demo")).with_credentials_root(PathBuf::from("/tmp/creds"));
    assert_eq!(paths.credentials_root, PathBuf::from("/tmp/creds"));
    assert_eq!(paths.token_cache, PathBuf::from("/tmp/creds/token_cache.json"));
  }

  #[test]
  fn test_record_and_key_paths_are_scoped_by_project() {
    let paths = CredentialPaths::under(Path::new("/home/demo"));
    let project = ProjectId::new("demo-proj-1").unwrap();
    assert_eq!(
      paths.service_account_record(&project),
      PathBuf::from("/home/demo/.gcauth/demo-proj-1/service-account.json")
    );
    assert_eq!(
      paths.keys_dir(&project),
      PathBuf::from("/home/demo/.gcauth/demo-proj-1/keys")
    );
  }
}
