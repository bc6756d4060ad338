// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Helm values for the WarpStream agent chart.
//!
//! The values file is a YAML template with `${NAME}` placeholders. Once every
//! input is known the template is filled, parsed and the `certificate` block
//! is forced to agree with whether a TLS secret exists.

use std::collections::BTreeMap;
use std::path::Path;

use gantry_config::{ConfigError, GantryConfig, SecretString};
use gantry_render::{parse_yaml, render, RenderResult, Template, Tree};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::collaborators::{SecretStore, LATEST_VERSION};
use crate::error::{ProvisionError, ProvisionResult};
use crate::identity::bucket_url;

/// Values substituted into the agent values template.
#[derive(Debug, Clone)]
pub struct AgentPlaceholders {
	pub bucket_url: String,
	pub agent_key: SecretString,
	pub virtual_cluster_id: SecretString,
	pub warpstream_region: String,
	pub service_account_name: String,
	pub dns_record_name: String,
	pub certificate_secret_name: String,
}

impl AgentPlaceholders {
	/// Placeholder names as they appear in the template.
	pub const NAMES: [&'static str; 7] = [
		"BUCKET_URL",
		"AGENT_KEY",
		"VIRTUAL_CLUSTER_ID",
		"WARPSTREAM_REGION",
		"SERVICE_ACCOUNT_NAME",
		"DNS_RECORD_NAME",
		"CERTIFICATE_SECRET_NAME",
	];

	pub fn to_mapping(&self) -> BTreeMap<&'static str, &str> {
		let values = [
			self.bucket_url.as_str(),
			self.agent_key.expose().as_str(),
			self.virtual_cluster_id.expose().as_str(),
			self.warpstream_region.as_str(),
			self.service_account_name.as_str(),
			self.dns_record_name.as_str(),
			self.certificate_secret_name.as_str(),
		];
		Self::NAMES.into_iter().zip(values).collect()
	}
}

/// Sets `certificate.enableTLS` and drops `certificate.secretName` when TLS is off.
///
/// A `certificate` entry that is not a mapping is replaced by one.
pub fn ensure_tls(values: Tree, tls_enabled: bool) -> Tree {
	let mut root = match values {
		Value::Object(map) => map,
		Value::Null => Map::new(),
		other => {
			warn!(kind = value_kind(&other), "values root is not a mapping, replacing");
			Map::new()
		}
	};

	let certificate = root
		.entry("certificate")
		.or_insert_with(|| Value::Object(Map::new()));
	if !certificate.is_object() {
		*certificate = Value::Object(Map::new());
	}
	if let Value::Object(cert) = certificate {
		cert.insert("enableTLS".to_string(), Value::Bool(tls_enabled));
		if !tls_enabled {
			cert.remove("secretName");
		}
	}

	Value::Object(root)
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "sequence",
		Value::Object(_) => "mapping",
	}
}

/// Substitute, parse and apply the TLS rule.
pub fn render_agent_values(
	template: &str,
	placeholders: &AgentPlaceholders,
	tls_enabled: bool,
) -> RenderResult<Tree> {
	let text = render(template, &placeholders.to_mapping());
	let values = parse_yaml(&text)?;
	Ok(ensure_tls(values, tls_enabled))
}

async fn secret_or_empty(
	store: &dyn SecretStore,
	config: &GantryConfig,
	secret_id: Option<&str>,
) -> ProvisionResult<SecretString> {
	match secret_id {
		None => Ok(SecretString::from("")),
		Some(id) => {
			let project = config.gcp.require_project()?;
			store.secret_data(project, id, LATEST_VERSION).await
		}
	}
}

/// Builds the agent's Helm values from configuration and secrets.
///
/// The agent key and virtual cluster id are fetched concurrently; an
/// unconfigured secret id contributes an empty string.
pub async fn resolve_agent_values(
	config: &GantryConfig,
	store: &dyn SecretStore,
	template: &str,
) -> ProvisionResult<Tree> {
	let agent = &config.agent;

	let (agent_key, virtual_cluster_id) = futures::try_join!(
		secret_or_empty(store, config, agent.agent_key_secret_id.as_deref()),
		secret_or_empty(store, config, agent.virtual_cluster_id_secret_id.as_deref()),
	)?;

	let warpstream_region = agent
		.warpstream_region(config.gcp.region.as_deref())
		.ok_or_else(|| ConfigError::missing_field("gcp.region (GANTRY_GCP_REGION)"))?;

	let placeholders = AgentPlaceholders {
		bucket_url: bucket_url(&agent.bucket_name()),
		agent_key,
		virtual_cluster_id,
		warpstream_region,
		service_account_name: agent.ksa_name(),
		dns_record_name: agent.dns_record_name.clone().unwrap_or_default(),
		certificate_secret_name: agent.tls_secret_name().unwrap_or_default(),
	};

	let parsed = Template::new(template);
	let unresolved = parsed.unresolved(&placeholders.to_mapping());
	if !unresolved.is_empty() {
		debug!(?unresolved, "values template has placeholders left for the chart");
	}

	let values = render_agent_values(template, &placeholders, agent.tls_enabled())?;
	info!(
		namespace = %agent.namespace,
		tls_enabled = agent.tls_enabled(),
		"agent values rendered"
	);
	Ok(values)
}

/// Reads the values template from disk.
pub async fn load_values_template(path: &Path) -> ProvisionResult<String> {
	match tokio::fs::read_to_string(path).await {
		Ok(text) => Ok(text),
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ProvisionError::TemplateNotFound {
			path: path.to_path_buf(),
		}),
		Err(e) => Err(ProvisionError::Io {
			path: path.to_path_buf(),
			source: e,
		}),
	}
}
