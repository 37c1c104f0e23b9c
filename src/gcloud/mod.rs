//! Google Cloud boundary: API trait seams, the blocking HTTP client, the
//! gcloud-based login flow, local key generation, and wire models.

pub mod api;
pub mod client;
pub mod keys;
pub mod models;

pub use api::{ApiError, GeneratedKeypair, IamApi, KeypairGenerator, LoginFlow, ResourceManagerApi, TokenRefresher};
pub use client::{GcloudLoginFlow, GoogleApiClient};
pub use keys::Ed25519KeypairGenerator;
pub use models::{AdcFile, CachedToken, ServiceAccountInfo, ServiceAccountKeyFile, TokenResponse};
