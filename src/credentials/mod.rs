//! Credential resolution, storage, and provisioning for Google Cloud.
//!
//! The pieces fit together in a fixed shape: a [`RunContext`] snapshots the
//! CLI flags and environment once at startup, the [`CredentialResolver`]
//! walks its strategy ladder to produce a [`Credential`] plus
//! [`ProjectIdentity`], the [`CredentialStore`] owns every file under the
//! private credentials root, and the [`ServiceAccountProvisioner`] builds on
//! both to create a service account exactly once per project.
//!
//! Resolution order (highest priority first):
//! 1. explicit `--account`/`--project`/`--key-file` input,
//! 2. the gcloud config (`--use-default-login`; defects there are fatal),
//! 3. Application Default Credentials, recreating them via the browser
//!    login flow when absent,
//! 4. an interactive prompt.

pub mod context;
pub mod gcloud_config;
pub mod provisioner;
pub mod resolver;
pub mod store;
pub mod types;

pub use context::{CredentialPaths, RunContext};
pub use provisioner::{ProvisionOptions, ServiceAccountProvisioner};
pub use resolver::{CredentialResolver, Prompter, Resolution, StdinPrompter};
pub use store::{CredentialStore, TokenCache};
pub use types::{
  AuthError, AuthStrategy, Credential, CredentialKind, KeypairPaths, ProjectId, ProjectIdentity, ProjectNumber,
  ServiceAccountRecord,
};
