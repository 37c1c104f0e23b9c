//! Wire and on-disk data models for the Google Cloud boundary.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The Application Default Credentials file written by
/// `gcloud auth application-default login`.
///
/// Only `quota_project_id` and `type` are interpreted; the remaining fields
/// are carried opaquely so a rewrite of the file loses nothing.
#[derive(Clone, Serialize, Deserialize)]
pub struct AdcFile {
  /// Project charged for quota; the project id this tool resolves.
  #[serde(default)]
  pub quota_project_id: Option<String>,
  /// Credential flavor: `authorized_user`, `service_account`, or
  /// `external_account`.
  #[serde(rename = "type", default)]
  pub credential_type: Option<String>,
  #[serde(default)]
  pub account: Option<String>,
  #[serde(default)]
  pub client_id: Option<String>,
  #[serde(default)]
  pub client_secret: Option<String>,
  #[serde(default)]
  pub refresh_token: Option<String>,
  #[serde(default)]
  pub universe_domain: Option<String>,
  /// Fields this tool passes through without interpreting.
  #[serde(flatten)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

impl fmt::Debug for AdcFile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AdcFile")
      .field("quota_project_id", &self.quota_project_id)
      .field("credential_type", &self.credential_type)
      .field("account", &self.account)
      .field("client_id", &self.client_id)
      .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
      .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
      .field("universe_domain", &self.universe_domain)
      .finish()
  }
}

/// Cached user OAuth token owned by this tool.
#[derive(Clone, Serialize, Deserialize)]
pub struct CachedToken {
  #[serde(default)]
  pub access_token: Option<String>,
  #[serde(default)]
  pub refresh_token: Option<String>,
  /// Whether the access token was already expired when cached.
  #[serde(default)]
  pub expired: bool,
  #[serde(default)]
  pub expiry: Option<DateTime<Utc>>,
  #[serde(default)]
  pub scopes: Vec<String>,
  /// Account email the token belongs to.
  #[serde(default)]
  pub account: Option<String>,
  /// OAuth client the refresh token was minted for.
  #[serde(default)]
  pub client_id: Option<String>,
  #[serde(default)]
  pub client_secret: Option<String>,
}

impl fmt::Debug for CachedToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CachedToken")
      .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
      .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
      .field("expired", &self.expired)
      .field("expiry", &self.expiry)
      .field("scopes", &self.scopes)
      .field("account", &self.account)
      .field("client_id", &self.client_id)
      .finish()
  }
}

/// A service-account key file supplied via `--key-file` or discovered
/// through `GOOGLE_APPLICATION_CREDENTIALS`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccountKeyFile {
  #[serde(rename = "type", default)]
  pub credential_type: Option<String>,
  #[serde(default)]
  pub project_id: Option<String>,
  #[serde(default)]
  pub client_email: Option<String>,
  #[serde(default)]
  pub client_id: Option<String>,
  #[serde(default)]
  pub private_key_id: Option<String>,
}

/// Service account metadata returned by the IAM API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountInfo {
  /// Resource name, `projects/{project}/serviceAccounts/{email}`.
  pub name: String,
  pub email: String,
  #[serde(default)]
  pub unique_id: String,
  #[serde(default)]
  pub oauth2_client_id: String,
  #[serde(default)]
  pub display_name: Option<String>,
  #[serde(default)]
  pub project_id: Option<String>,
}

/// Body of an IAM service-account creation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceAccountRequest {
  pub account_id: String,
  pub service_account: ServiceAccountSettings,
}

/// Mutable settings accepted at creation time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountSettings {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
}

/// Project metadata returned by Cloud Resource Manager.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
  /// Resource name, `projects/{project_number}`.
  pub name: String,
  #[serde(default)]
  pub project_id: Option<String>,
  #[serde(default)]
  pub state: Option<String>,
}

/// Response from the OAuth token endpoint.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
  pub access_token: String,
  #[serde(default)]
  pub refresh_token: Option<String>,
  /// Token lifetime in seconds.
  #[serde(default)]
  pub expires_in: Option<i64>,
  #[serde(default)]
  pub scope: Option<String>,
}

impl fmt::Debug for TokenResponse {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TokenResponse")
      .field("access_token", &"<redacted>")
      .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
      .field("expires_in", &self.expires_in)
      .field("scope", &self.scope)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_adc_file_preserves_unknown_fields() {
    let raw = r#"{
      "account": "",
      "client_id": "764086051850.apps.googleusercontent.com",
      "client_secret": "d-secret",
      "quota_project_id": "weather-454da",
      "refresh_token": "1//refresh",
      "type": "authorized_user",
      "universe_domain": "googleapis.com",
      "custom_field": {"nested": true}
    }"#;

    let adc: AdcFile = serde_json::from_str(raw).unwrap();
    assert_eq!(adc.quota_project_id.as_deref(), Some("weather-454da"));
    assert_eq!(adc.credential_type.as_deref(), Some("authorized_user"));
    assert!(adc.extra.contains_key("custom_field"));

    let rendered = serde_json::to_string(&adc).unwrap();
    assert!(rendered.contains("custom_field"));
  }

  #[test]
  fn test_adc_debug_redacts_secrets() {
    let adc: AdcFile = serde_json::from_str(
      r#"{"client_secret": "d-secret", "refresh_token": "1//refresh", "type": "authorized_user"}"#,
    )
    .unwrap();

    let rendered = format!("{adc:?}");
    assert!(!rendered.contains("d-secret"));
    assert!(!rendered.contains("1//refresh"));
  }

  #[test]
  fn test_service_account_info_uses_camel_case() {
    let raw = r#"{
      "name": "projects/demo-proj-1/serviceAccounts/svc@demo-proj-1.iam.gserviceaccount.com",
      "email": "svc@demo-proj-1.iam.gserviceaccount.com",
      "uniqueId": "111222333444555666777",
      "oauth2ClientId": "111222333444555666777",
      "displayName": "gcauth provisioned",
      "projectId": "demo-proj-1"
    }"#;

    let info: ServiceAccountInfo = serde_json::from_str(raw).unwrap();
    assert_eq!(info.unique_id, "111222333444555666777");
    assert_eq!(info.oauth2_client_id, "111222333444555666777");
    assert_eq!(info.display_name.as_deref(), Some("gcauth provisioned"));
  }

  #[test]
  fn test_create_request_serializes_camel_case() {
    let request = CreateServiceAccountRequest {
      account_id: "svc-demo-proj-1-1a2b3c4d".to_string(),
      service_account: ServiceAccountSettings {
        display_name: Some("gcauth".to_string()),
      },
    };

    let rendered = serde_json::to_value(&request).unwrap();
    assert_eq!(rendered["accountId"], "svc-demo-proj-1-1a2b3c4d");
    assert_eq!(rendered["serviceAccount"]["displayName"], "gcauth");
  }

  #[test]
  fn test_token_response_debug_redacts_token() {
    let response: TokenResponse =
      serde_json::from_str(r#"{"access_token": "ya29.fresh", "expires_in": 3599}"#).unwrap();
    let rendered = format!("{response:?}");
    assert!(!rendered.contains("ya29.fresh"));
    assert_eq!(response.expires_in, Some(3599));
  }
}
