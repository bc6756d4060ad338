// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Traits for values that only exist once cloud resources have been created.

use std::collections::HashMap;

use async_trait::async_trait;
use gantry_config::{load_secret_env, SecretString};
use tracing::debug;

use crate::error::{ProvisionError, ProvisionResult};

/// Secret Manager version alias for the newest enabled version.
pub const LATEST_VERSION: &str = "latest";

/// Attributes of a GKE cluster that become known after it is created.
#[async_trait]
pub trait ClusterOutputs: Send + Sync {
	async fn name(&self) -> ProvisionResult<String>;

	/// Public IP endpoint of the control plane.
	async fn endpoint(&self) -> ProvisionResult<String>;

	/// DNS-based control plane endpoint, when the cluster exposes one.
	async fn dns_endpoint(&self) -> ProvisionResult<Option<String>> {
		Ok(None)
	}

	/// Base64-encoded cluster CA certificate.
	async fn ca_certificate(&self) -> ProvisionResult<String>;
}

/// Read access to secret payloads.
#[async_trait]
pub trait SecretStore: Send + Sync {
	async fn secret_data(
		&self,
		project: &str,
		secret_id: &str,
		version: &str,
	) -> ProvisionResult<SecretString>;
}

/// Cluster outputs that are already known.
#[derive(Debug, Clone, Default)]
pub struct StaticClusterOutputs {
	pub name: String,
	pub endpoint: String,
	pub dns_endpoint: Option<String>,
	pub ca_certificate: String,
}

impl StaticClusterOutputs {
	pub fn new(
		name: impl Into<String>,
		endpoint: impl Into<String>,
		ca_certificate: impl Into<String>,
	) -> Self {
		Self {
			name: name.into(),
			endpoint: endpoint.into(),
			dns_endpoint: None,
			ca_certificate: ca_certificate.into(),
		}
	}

	pub fn with_dns_endpoint(mut self, dns_endpoint: impl Into<String>) -> Self {
		self.dns_endpoint = Some(dns_endpoint.into());
		self
	}
}

#[async_trait]
impl ClusterOutputs for StaticClusterOutputs {
	async fn name(&self) -> ProvisionResult<String> {
		Ok(self.name.clone())
	}

	async fn endpoint(&self) -> ProvisionResult<String> {
		Ok(self.endpoint.clone())
	}

	async fn dns_endpoint(&self) -> ProvisionResult<Option<String>> {
		Ok(self.dns_endpoint.clone().filter(|s| !s.is_empty()))
	}

	async fn ca_certificate(&self) -> ProvisionResult<String> {
		Ok(self.ca_certificate.clone())
	}
}

/// Secrets held in memory, keyed by secret id. Project and version are ignored.
#[derive(Debug, Clone, Default)]
pub struct InMemorySecretStore {
	secrets: HashMap<String, SecretString>,
}

impl InMemorySecretStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_secret(mut self, secret_id: impl Into<String>, value: impl Into<SecretString>) -> Self {
		self.insert(secret_id, value);
		self
	}

	pub fn insert(&mut self, secret_id: impl Into<String>, value: impl Into<SecretString>) {
		self.secrets.insert(secret_id.into(), value.into());
	}
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
	async fn secret_data(
		&self,
		_project: &str,
		secret_id: &str,
		_version: &str,
	) -> ProvisionResult<SecretString> {
		self
			.secrets
			.get(secret_id)
			.cloned()
			.ok_or_else(|| ProvisionError::SecretNotFound {
				secret_id: secret_id.to_string(),
			})
	}
}

/// Secrets read from `GANTRY_SECRET_<ID>` or the file named by `GANTRY_SECRET_<ID>_FILE`.
///
/// The id is upper-cased and every non-alphanumeric character becomes `_`,
/// so `agent-key` maps to `GANTRY_SECRET_AGENT_KEY`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
	pub fn env_name(secret_id: &str) -> String {
		let suffix: String = secret_id
			.chars()
			.map(|c| {
				if c.is_ascii_alphanumeric() {
					c.to_ascii_uppercase()
				} else {
					'_'
				}
			})
			.collect();
		format!("GANTRY_SECRET_{suffix}")
	}
}

#[async_trait]
impl SecretStore for EnvSecretStore {
	async fn secret_data(
		&self,
		_project: &str,
		secret_id: &str,
		_version: &str,
	) -> ProvisionResult<SecretString> {
		let name = Self::env_name(secret_id);
		debug!(secret_id, env = %name, "reading secret from environment");
		load_secret_env(&name)
			.map_err(|e| ProvisionError::resolution(format!("secret {secret_id}"), e.to_string()))?
			.ok_or_else(|| ProvisionError::SecretNotFound {
				secret_id: secret_id.to_string(),
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct IpOnly;

	#[async_trait]
	impl ClusterOutputs for IpOnly {
		async fn name(&self) -> ProvisionResult<String> {
			Ok("c".to_string())
		}

		async fn endpoint(&self) -> ProvisionResult<String> {
			Ok("10.0.0.1".to_string())
		}

		async fn ca_certificate(&self) -> ProvisionResult<String> {
			Ok(String::new())
		}
	}

	#[tokio::test]
	async fn test_dns_endpoint_defaults_to_none() {
		assert_eq!(IpOnly.dns_endpoint().await.unwrap(), None);
	}

	#[tokio::test]
	async fn test_static_outputs_ignore_empty_dns() {
		let outputs = StaticClusterOutputs::new("c", "1.2.3.4", "Q0E=").with_dns_endpoint("");
		assert_eq!(outputs.dns_endpoint().await.unwrap(), None);
	}

	#[tokio::test]
	async fn test_in_memory_store_lookup() {
		let store = InMemorySecretStore::new().with_secret("agent-key", "aks_123");
		let value = store
			.secret_data("p", "agent-key", LATEST_VERSION)
			.await
			.unwrap();
		assert_eq!(value.expose(), "aks_123");

		let err = store
			.secret_data("p", "missing", LATEST_VERSION)
			.await
			.unwrap_err();
		assert!(matches!(err, ProvisionError::SecretNotFound { .. }));
	}

	#[test]
	fn test_env_name_mapping() {
		assert_eq!(EnvSecretStore::env_name("agent-key"), "GANTRY_SECRET_AGENT_KEY");
		assert_eq!(
			EnvSecretStore::env_name("ws.vcid/v2"),
			"GANTRY_SECRET_WS_VCID_V2"
		);
	}

	#[tokio::test]
	async fn test_env_store_reads_variable() {
		std::env::set_var("GANTRY_SECRET_TEST_COLLAB_PRESENT", "vci_abc");
		let value = EnvSecretStore
			.secret_data("p", "test-collab-present", LATEST_VERSION)
			.await
			.unwrap();
		assert_eq!(value.expose(), "vci_abc");
		std::env::remove_var("GANTRY_SECRET_TEST_COLLAB_PRESENT");
	}

	#[tokio::test]
	async fn test_env_store_missing_is_not_found() {
		let err = EnvSecretStore
			.secret_data("p", "test-collab-absent", LATEST_VERSION)
			.await
			.unwrap_err();
		assert!(matches!(err, ProvisionError::SecretNotFound { .. }));
	}
}
