//! Blocking HTTP client for the Google Cloud REST surface, plus the
//! subprocess-based interactive login flow.

use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::Context as _;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::api::{ApiError, IamApi, LoginFlow, ResourceManagerApi, TokenRefresher};
use super::models::{
  CachedToken, CreateServiceAccountRequest, ProjectResponse, ServiceAccountInfo, ServiceAccountSettings,
  TokenResponse,
};
use crate::credentials::types::{Credential, ProjectId, ProjectNumber};

const IAM_BASE: &str = "https://iam.googleapis.com/v1";
const RESOURCE_MANAGER_BASE: &str = "https://cloudresourcemanager.googleapis.com/v3";
const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// HTTP client for the IAM, Resource Manager, and OAuth token endpoints.
///
/// Each request carries the per-attempt timeout configured at construction;
/// retry pacing is the caller's concern and happens outside this client.
pub struct GoogleApiClient {
  http: Client,
  /// Bearer token used when a call is not given an explicit credential.
  token: Option<String>,
  iam_base: String,
  resource_manager_base: String,
  token_url: String,
}

impl GoogleApiClient {
  /// Create a client with the given per-request timeout.
  ///
  /// # Errors
  /// Returns an error when the underlying HTTP client cannot be built.
  pub fn new(timeout_secs: u64) -> Result<Self, ApiError> {
    let http = Client::builder()
      .timeout(Duration::from_secs(timeout_secs))
      .user_agent(format!("gcauth/{} ({})", env!("CARGO_PKG_VERSION"), env!("TARGET")))
      .build()
      .map_err(|source| ApiError::Transport {
        operation: "build HTTP client".to_string(),
        source,
      })?;

    Ok(Self {
      http,
      token: None,
      iam_base: IAM_BASE.to_string(),
      resource_manager_base: RESOURCE_MANAGER_BASE.to_string(),
      token_url: OAUTH_TOKEN_URL.to_string(),
    })
  }

  /// Attach an ambient bearer token used for read calls.
  pub fn with_ambient_token(mut self, token: impl Into<String>) -> Self {
    self.token = Some(token.into());
    self
  }

  fn get(&self, operation: &str, url: &str) -> Result<Response, ApiError> {
    let mut request = self.http.get(url);
    if let Some(token) = self.token.as_deref() {
      request = request.bearer_auth(token);
    }
    request.send().map_err(|source| ApiError::Transport {
      operation: operation.to_string(),
      source,
    })
  }

  fn decode<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
      let body = response.text().unwrap_or_default();
      return Err(ApiError::Status {
        status: status.as_u16(),
        message: summarize_body(&body),
      });
    }
    response.json().map_err(|err| ApiError::Decode {
      message: format!("{operation}: {err}"),
    })
  }
}

/// Trim an error body down to something that fits on one log line.
fn summarize_body(body: &str) -> String {
  let trimmed = body.trim();
  if trimmed.is_empty() {
    return "(empty body)".to_string();
  }
  if trimmed.chars().count() > 200 {
    let head: String = trimmed.chars().take(200).collect();
    format!("{head}…")
  } else {
    trimmed.to_string()
  }
}

impl ResourceManagerApi for GoogleApiClient {
  fn lookup_project_number(&self, project: &ProjectId) -> Result<ProjectNumber, ApiError> {
    let url = format!("{}/projects/{}", self.resource_manager_base, project);
    let response = self.get("project metadata lookup", &url)?;
    let metadata: ProjectResponse = Self::decode("project metadata lookup", response)?;

    // The resource name is `projects/{project_number}`.
    let number = metadata.name.rsplit('/').next().unwrap_or_default();
    ProjectNumber::new(number).map_err(|_| ApiError::Decode {
      message: format!("project resource name \"{}\" does not end in a 12-digit number", metadata.name),
    })
  }
}

impl IamApi for GoogleApiClient {
  fn get_service_account(&self, project: &ProjectId, email: &str) -> Result<Option<ServiceAccountInfo>, ApiError> {
    let url = format!("{}/projects/{}/serviceAccounts/{}", self.iam_base, project, email);
    let response = self.get("service account lookup", &url)?;
    if response.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    Self::decode("service account lookup", response).map(Some)
  }

  fn create_service_account(
    &self,
    bootstrap: &Credential,
    project: &ProjectId,
    account_id: &str,
    display_name: Option<&str>,
  ) -> Result<ServiceAccountInfo, ApiError> {
    let url = format!("{}/projects/{}/serviceAccounts", self.iam_base, project);
    let body = CreateServiceAccountRequest {
      account_id: account_id.to_string(),
      service_account: ServiceAccountSettings {
        display_name: display_name.map(str::to_string),
      },
    };

    let mut request = self.http.post(&url).json(&body);
    if let Some(token) = bootstrap.access_token.as_deref().or(self.token.as_deref()) {
      request = request.bearer_auth(token);
    }

    let response = request.send().map_err(|source| ApiError::Transport {
      operation: "service account creation".to_string(),
      source,
    })?;
    Self::decode("service account creation", response)
  }
}

impl TokenRefresher for GoogleApiClient {
  fn refresh(&self, token: &CachedToken) -> Result<TokenResponse, ApiError> {
    let mut form: Vec<(&str, String)> = vec![("grant_type", "refresh_token".to_string())];
    if let Some(refresh_token) = &token.refresh_token {
      form.push(("refresh_token", refresh_token.clone()));
    }
    if let Some(client_id) = &token.client_id {
      form.push(("client_id", client_id.clone()));
    }
    if let Some(client_secret) = &token.client_secret {
      form.push(("client_secret", client_secret.clone()));
    }

    let response = self
      .http
      .post(&self.token_url)
      .form(&form)
      .send()
      .map_err(|source| ApiError::Transport {
        operation: "token refresh".to_string(),
        source,
      })?;
    Self::decode("token refresh", response)
  }
}

/// Interactive ADC setup that shells out to the gcloud CLI.
///
/// `gcloud auth application-default login` opens a browser, runs a local
/// callback server, and rewrites the well-known ADC file. The subprocess
/// blocks until the user completes or abandons the flow.
#[derive(Debug, Default)]
pub struct GcloudLoginFlow;

impl GcloudLoginFlow {
  /// Create a new login flow.
  pub fn new() -> Self {
    Self
  }
}

impl LoginFlow for GcloudLoginFlow {
  fn run(&self) -> anyhow::Result<()> {
    // Probe first so a missing binary yields an actionable message instead
    // of a raw spawn error.
    let probe = Command::new("gcloud")
      .arg("--version")
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .status();
    if probe.is_err() {
      anyhow::bail!("gcloud CLI is not installed; install it from https://cloud.google.com/sdk/docs/install");
    }

    debug!("starting browser-based ADC login via gcloud");
    let status = Command::new("gcloud")
      .args(["auth", "application-default", "login"])
      .status()
      .context("failed to launch gcloud login")?;
    if !status.success() {
      anyhow::bail!("gcloud login exited with {status}");
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_summarize_body_truncates_long_bodies() {
    let long = "x".repeat(500);
    let summary = summarize_body(&long);
    assert!(summary.chars().count() <= 201);
    assert!(summary.ends_with('…'));
  }

  #[test]
  fn test_summarize_body_handles_empty_and_short_bodies() {
    assert_eq!(summarize_body("   "), "(empty body)");
    assert_eq!(summarize_body(" short \n"), "short");
  }

  #[test]
  fn test_status_errors_classify_transient_codes() {
    for status in [500u16, 502, 503, 429, 408] {
      let err = ApiError::Status {
        status,
        message: String::new(),
      };
      assert!(err.is_transient(), "HTTP {status} should be transient");
    }

    for status in [400u16, 401, 403, 404, 409] {
      let err = ApiError::Status {
        status,
        message: String::new(),
      };
      assert!(!err.is_transient(), "HTTP {status} should not be transient");
    }
  }

  #[test]
  fn test_decode_errors_are_never_transient() {
    let err = ApiError::Decode {
      message: "garbage".to_string(),
    };
    assert!(!err.is_transient());
  }
}
