// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! WarpStream agent deployment section.
//!
//! Names that are not configured explicitly are derived from the stack prefix
//! and namespace, e.g. the bucket `ws-warpstream-bucket` and the Kubernetes
//! service account `ws-warpstream-sa`.

use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_NAMESPACE: &str = "warpstream";
pub const DEFAULT_STACK_PREFIX: &str = "ws";
pub const DEFAULT_K8S_TLS_SECRET_NAME: &str = "warpstream-tls";
pub const DEFAULT_CHART_NAME: &str = "warpstream-agent";
pub const DEFAULT_CHART_REPO: &str = "https://warpstreamlabs.github.io/charts";
pub const DEFAULT_CHART_VERSION: &str = "0.1.19";
pub const DEFAULT_VALUES_TEMPLATE: &str = "values.yaml";

/// Helm chart coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartConfig {
	pub name: String,
	pub repo: String,
	pub version: String,
}

/// Agent deployment configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
	pub namespace: String,
	pub stack_prefix: String,
	/// Secret Manager secret holding the target cluster's kubeconfig.
	pub kubeconfig_secret_id: Option<String>,
	bucket_name: Option<String>,
	pub force_destroy_bucket: bool,
	/// Existing Google service account to bind instead of creating one.
	pub gsa_email: Option<String>,
	ksa_name: Option<String>,
	pub grant_bucket_roles: bool,
	/// Secret Manager secret holding `{"tls.crt", "tls.key", "ca.crt"}`.
	pub gcp_tls_cert_secret_id: Option<String>,
	pub k8s_tls_secret_name: String,
	pub chart: ChartConfig,
	pub values_template_path: PathBuf,
	pub agent_key_secret_id: Option<String>,
	pub virtual_cluster_id_secret_id: Option<String>,
	pub dns_record_name: Option<String>,
	warpstream_region: Option<String>,
}

impl AgentConfig {
	/// Storage bucket, `{prefix}-{namespace}-bucket` unless configured.
	pub fn bucket_name(&self) -> String {
		self
			.bucket_name
			.clone()
			.unwrap_or_else(|| format!("{}-{}-bucket", self.stack_prefix, self.namespace))
	}

	/// Kubernetes service account, `{prefix}-{namespace}-sa` unless configured.
	pub fn ksa_name(&self) -> String {
		self
			.ksa_name
			.clone()
			.unwrap_or_else(|| self.gsa_account_id())
	}

	/// Account id used when a Google service account is created.
	pub fn gsa_account_id(&self) -> String {
		format!("{}-{}-sa", self.stack_prefix, self.namespace)
	}

	pub fn tls_enabled(&self) -> bool {
		self.gcp_tls_cert_secret_id.is_some()
	}

	/// Kubernetes TLS secret name, only when TLS material is configured.
	pub fn tls_secret_name(&self) -> Option<String> {
		self
			.tls_enabled()
			.then(|| format!("{}-{}", self.stack_prefix, self.k8s_tls_secret_name))
	}

	/// Region advertised to the agent, defaulting to the deployment region.
	pub fn warpstream_region(&self, fallback: Option<&str>) -> Option<String> {
		self
			.warpstream_region
			.clone()
			.or_else(|| fallback.map(str::to_string))
	}
}

impl Default for AgentConfig {
	fn default() -> Self {
		AgentConfigLayer::default().finalize()
	}
}

/// Agent configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentConfigLayer {
	#[serde(default)]
	pub namespace: Option<String>,
	#[serde(default)]
	pub stack_prefix: Option<String>,
	#[serde(default)]
	pub kubeconfig_secret_id: Option<String>,
	#[serde(default)]
	pub bucket_name: Option<String>,
	#[serde(default)]
	pub force_destroy_bucket: Option<bool>,
	#[serde(default)]
	pub gsa_email: Option<String>,
	#[serde(default)]
	pub ksa_name: Option<String>,
	#[serde(default)]
	pub grant_bucket_roles: Option<bool>,
	#[serde(default)]
	pub gcp_tls_cert_secret_id: Option<String>,
	#[serde(default)]
	pub k8s_tls_secret_name: Option<String>,
	#[serde(default)]
	pub chart_name: Option<String>,
	#[serde(default)]
	pub chart_repo: Option<String>,
	#[serde(default)]
	pub chart_version: Option<String>,
	#[serde(default)]
	pub values_template_path: Option<PathBuf>,
	#[serde(default)]
	pub agent_key_secret_id: Option<String>,
	#[serde(default)]
	pub virtual_cluster_id_secret_id: Option<String>,
	#[serde(default)]
	pub dns_record_name: Option<String>,
	#[serde(default)]
	pub warpstream_region: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|s| !s.is_empty())
}

impl AgentConfigLayer {
	pub fn merge(&mut self, other: AgentConfigLayer) {
		overwrite!(
			self,
			other,
			namespace,
			stack_prefix,
			kubeconfig_secret_id,
			bucket_name,
			force_destroy_bucket,
			gsa_email,
			ksa_name,
			grant_bucket_roles,
			gcp_tls_cert_secret_id,
			k8s_tls_secret_name,
			chart_name,
			chart_repo,
			chart_version,
			values_template_path,
			agent_key_secret_id,
			virtual_cluster_id_secret_id,
			dns_record_name,
			warpstream_region,
		);
	}

	pub fn finalize(self) -> AgentConfig {
		AgentConfig {
			namespace: non_empty(self.namespace).unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
			stack_prefix: non_empty(self.stack_prefix)
				.unwrap_or_else(|| DEFAULT_STACK_PREFIX.to_string()),
			kubeconfig_secret_id: non_empty(self.kubeconfig_secret_id),
			bucket_name: non_empty(self.bucket_name),
			force_destroy_bucket: self.force_destroy_bucket.unwrap_or(true),
			gsa_email: non_empty(self.gsa_email),
			ksa_name: non_empty(self.ksa_name),
			grant_bucket_roles: self.grant_bucket_roles.unwrap_or(true),
			gcp_tls_cert_secret_id: non_empty(self.gcp_tls_cert_secret_id),
			k8s_tls_secret_name: non_empty(self.k8s_tls_secret_name)
				.unwrap_or_else(|| DEFAULT_K8S_TLS_SECRET_NAME.to_string()),
			chart: ChartConfig {
				name: non_empty(self.chart_name).unwrap_or_else(|| DEFAULT_CHART_NAME.to_string()),
				repo: non_empty(self.chart_repo).unwrap_or_else(|| DEFAULT_CHART_REPO.to_string()),
				version: non_empty(self.chart_version)
					.unwrap_or_else(|| DEFAULT_CHART_VERSION.to_string()),
			},
			values_template_path: self
				.values_template_path
				.unwrap_or_else(|| PathBuf::from(DEFAULT_VALUES_TEMPLATE)),
			agent_key_secret_id: non_empty(self.agent_key_secret_id),
			virtual_cluster_id_secret_id: non_empty(self.virtual_cluster_id_secret_id),
			dns_record_name: non_empty(self.dns_record_name),
			warpstream_region: non_empty(self.warpstream_region),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_defaults() {
		let config = AgentConfig::default();
		assert_eq!(config.namespace, "warpstream");
		assert_eq!(config.stack_prefix, "ws");
		assert_eq!(config.chart.name, "warpstream-agent");
		assert_eq!(config.chart.repo, "https://warpstreamlabs.github.io/charts");
		assert_eq!(config.chart.version, "0.1.19");
		assert_eq!(config.values_template_path, PathBuf::from("values.yaml"));
		assert!(config.force_destroy_bucket);
		assert!(config.grant_bucket_roles);
		assert!(!config.tls_enabled());
	}

	#[test]
	fn test_derived_names() {
		let config = AgentConfig::default();
		assert_eq!(config.bucket_name(), "ws-warpstream-bucket");
		assert_eq!(config.ksa_name(), "ws-warpstream-sa");
		assert_eq!(config.gsa_account_id(), "ws-warpstream-sa");
		assert_eq!(config.tls_secret_name(), None);
		assert_eq!(
			config.warpstream_region(Some("us-east1")).as_deref(),
			Some("us-east1")
		);
		assert_eq!(config.warpstream_region(None), None);
	}

	#[test]
	fn test_explicit_names_win() {
		let config = AgentConfigLayer {
			bucket_name: Some("my-bucket".to_string()),
			ksa_name: Some("agent".to_string()),
			warpstream_region: Some("europe-west4".to_string()),
			..Default::default()
		}
		.finalize();
		assert_eq!(config.bucket_name(), "my-bucket");
		assert_eq!(config.ksa_name(), "agent");
		assert_eq!(config.gsa_account_id(), "ws-warpstream-sa");
		assert_eq!(
			config.warpstream_region(Some("us-east1")).as_deref(),
			Some("europe-west4")
		);
	}

	#[test]
	fn test_empty_bucket_name_derives() {
		let config = AgentConfigLayer {
			bucket_name: Some(String::new()),
			..Default::default()
		}
		.finalize();
		assert_eq!(config.bucket_name(), "ws-warpstream-bucket");
	}

	#[test]
	fn test_tls_secret_name() {
		let config = AgentConfigLayer {
			gcp_tls_cert_secret_id: Some("warpstream-tls-cert".to_string()),
			stack_prefix: Some("prod".to_string()),
			..Default::default()
		}
		.finalize();
		assert!(config.tls_enabled());
		assert_eq!(config.tls_secret_name().as_deref(), Some("prod-warpstream-tls"));
	}

	#[test]
	fn test_deserialize_partial() {
		let toml_str = r#"
namespace = "agents"
chart_version = "0.2.0"
values_template_path = "deploy/values.yaml"
"#;
		let layer: AgentConfigLayer = toml::from_str(toml_str).unwrap();
		let config = layer.finalize();
		assert_eq!(config.namespace, "agents");
		assert_eq!(config.chart.version, "0.2.0");
		assert_eq!(config.chart.name, "warpstream-agent");
		assert_eq!(
			config.values_template_path,
			PathBuf::from("deploy/values.yaml")
		);
		assert_eq!(config.bucket_name(), "ws-agents-bucket");
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = AgentConfigLayer {
			namespace: Some("base".to_string()),
			chart_version: Some("0.1.0".to_string()),
			..Default::default()
		};
		base.merge(AgentConfigLayer {
			chart_version: Some("0.1.19".to_string()),
			..Default::default()
		});
		let config = base.finalize();
		assert_eq!(config.namespace, "base");
		assert_eq!(config.chart.version, "0.1.19");
	}

	proptest! {
		/// Derived names always embed prefix and namespace.
		#[test]
		fn derived_names_embed_prefix_and_namespace(
			prefix in "[a-z][a-z0-9]{0,8}",
			namespace in "[a-z][a-z0-9-]{0,20}",
		) {
			let config = AgentConfigLayer {
				stack_prefix: Some(prefix.clone()),
				namespace: Some(namespace.clone()),
				..Default::default()
			}
			.finalize();
			prop_assert_eq!(config.bucket_name(), format!("{prefix}-{namespace}-bucket"));
			prop_assert_eq!(config.ksa_name(), format!("{prefix}-{namespace}-sa"));
		}
	}
}
