//! Trait seams for the external Google Cloud collaborators.
//!
//! Each trait covers one unreliable boundary (IAM, project metadata, token
//! refresh, the browser login flow, key generation) so tests can substitute
//! fake implementations and count calls.

use std::fmt;

use super::models::{CachedToken, ServiceAccountInfo, TokenResponse};
use crate::credentials::types::{Credential, ProjectId, ProjectNumber};

/// Error from a Google API call.
#[derive(Debug)]
pub enum ApiError {
  /// The request never produced an HTTP response.
  Transport {
    operation: String,
    source: reqwest::Error,
  },
  /// The server answered with a non-success status.
  Status { status: u16, message: String },
  /// The response body could not be interpreted.
  Decode { message: String },
}

impl ApiError {
  /// Whether retrying could plausibly succeed.
  ///
  /// Connection problems and timeouts are transient, as are 408/429 and all
  /// server errors. Client errors and undecodable bodies are not.
  pub fn is_transient(&self) -> bool {
    match self {
      Self::Transport { source, .. } => source.is_timeout() || source.is_connect() || source.is_request(),
      Self::Status { status, .. } => *status == 408 || *status == 429 || *status >= 500,
      Self::Decode { .. } => false,
    }
  }
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Transport { operation, source } => write!(f, "{operation}: {source}"),
      Self::Status { status, message } => write!(f, "HTTP {status}: {message}"),
      Self::Decode { message } => write!(f, "unexpected response: {message}"),
    }
  }
}

impl std::error::Error for ApiError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Transport { source, .. } => Some(source),
      _ => None,
    }
  }
}

/// Project metadata lookups (Cloud Resource Manager).
pub trait ResourceManagerApi {
  /// Resolve the 12-digit project number for a project id.
  fn lookup_project_number(&self, project: &ProjectId) -> Result<ProjectNumber, ApiError>;
}

/// Service-account management (IAM).
pub trait IamApi {
  /// Look up a service account by email.
  ///
  /// # Returns
  /// * `Ok(Some(info))` when the account exists.
  /// * `Ok(None)` when the provider reports it does not.
  fn get_service_account(&self, project: &ProjectId, email: &str) -> Result<Option<ServiceAccountInfo>, ApiError>;

  /// Create a service account, authenticating as `bootstrap`.
  ///
  /// # Arguments
  /// * `bootstrap` - Resolved credential authorizing the creation call.
  /// * `project` - Project that will own the account.
  /// * `account_id` - Local part of the desired email.
  /// * `display_name` - Optional human-readable name.
  fn create_service_account(
    &self,
    bootstrap: &Credential,
    project: &ProjectId,
    account_id: &str,
    display_name: Option<&str>,
  ) -> Result<ServiceAccountInfo, ApiError>;
}

/// Exchange of a refresh token for a fresh access token.
pub trait TokenRefresher {
  /// Refresh the cached token's access token.
  fn refresh(&self, token: &CachedToken) -> Result<TokenResponse, ApiError>;
}

/// Interactive login that recreates the Application Default Credentials
/// file (opens a browser, runs a local callback server).
pub trait LoginFlow {
  /// Run the login flow to completion.
  fn run(&self) -> anyhow::Result<()>;
}

/// A freshly generated asymmetric keypair in PEM form.
pub struct GeneratedKeypair {
  /// Short identifier recorded as the record's `private_key_id`.
  pub key_id: String,
  /// PKCS#8 private key PEM.
  pub private_pem: String,
  /// SPKI public key PEM.
  pub public_pem: String,
}

// Key material stays out of logs.
impl fmt::Debug for GeneratedKeypair {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GeneratedKeypair")
      .field("key_id", &self.key_id)
      .field("private_pem", &"<redacted>")
      .field("public_pem", &"<present>")
      .finish()
  }
}

/// Generation of asymmetric key material for provisioned accounts.
pub trait KeypairGenerator {
  /// Generate a new keypair.
  fn generate(&self) -> anyhow::Result<GeneratedKeypair>;
}
