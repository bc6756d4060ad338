// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Kubernetes objects and IAM bindings that the agent chart depends on.

use std::collections::BTreeMap;

use gantry_config::{AgentConfig, GantryConfig, SecretString};
use gantry_render::RenderError;
use k8s_openapi::api::core::v1::{Namespace, Secret, ServiceAccount};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::collaborators::{SecretStore, LATEST_VERSION};
use crate::error::{ProvisionError, ProvisionResult};
use crate::identity::{
	iam_member, service_account_email, service_account_resource_id, workload_identity_member,
	GSA_ANNOTATION, STORAGE_OBJECT_ADMIN_ROLE, WORKLOAD_IDENTITY_USER_ROLE,
};

pub const AGENT_APP_LABEL: &str = "warpstream-agent";
pub const BUCKET_APP_LABEL: &str = "warpstream";

/// Certificate material for the agent's TLS secret.
#[derive(Debug, Clone)]
pub struct TlsMaterial {
	pub tls_crt: SecretString,
	pub tls_key: SecretString,
	pub ca_crt: String,
}

impl TlsMaterial {
	/// Parses a `{"tls.crt": .., "tls.key": .., "ca.crt": ..}` payload.
	/// `ca.crt` is optional and defaults to empty.
	pub fn from_json(secret_id: &str, payload: &str) -> ProvisionResult<Self> {
		let invalid = |message: String| ProvisionError::InvalidTlsPayload {
			secret_id: secret_id.to_string(),
			message,
		};

		let value: Value =
			serde_json::from_str(payload).map_err(|e| invalid(format!("not JSON: {e}")))?;
		let fields = value
			.as_object()
			.ok_or_else(|| invalid("expected a JSON object".to_string()))?;

		let field = |key: &str| -> ProvisionResult<Option<String>> {
			match fields.get(key) {
				None | Some(Value::Null) => Ok(None),
				Some(Value::String(s)) => Ok(Some(s.clone())),
				Some(_) => Err(invalid(format!("{key} must be a string"))),
			}
		};

		let tls_crt = field("tls.crt")?.ok_or_else(|| invalid("missing tls.crt".to_string()))?;
		let tls_key = field("tls.key")?.ok_or_else(|| invalid("missing tls.key".to_string()))?;
		let ca_crt = field("ca.crt")?.unwrap_or_default();

		Ok(Self {
			tls_crt: tls_crt.into(),
			tls_key: tls_key.into(),
			ca_crt,
		})
	}
}

/// Fetches the TLS payload when a certificate secret is configured.
pub async fn resolve_tls_material(
	config: &GantryConfig,
	store: &dyn SecretStore,
) -> ProvisionResult<Option<TlsMaterial>> {
	let Some(secret_id) = config.agent.gcp_tls_cert_secret_id.as_deref() else {
		return Ok(None);
	};
	let project = config.gcp.require_project()?;
	let payload = store.secret_data(project, secret_id, LATEST_VERSION).await?;
	TlsMaterial::from_json(secret_id, payload.expose()).map(Some)
}

/// The configured Google service account, or the one the deployment creates.
pub fn resolve_gsa_email(config: &GantryConfig) -> ProvisionResult<String> {
	match config.agent.gsa_email.as_deref() {
		Some(email) => Ok(email.to_string()),
		None => Ok(service_account_email(
			&config.agent.gsa_account_id(),
			config.gcp.require_project()?,
		)),
	}
}

/// Labels for the agent's storage bucket.
pub fn bucket_labels(agent: &AgentConfig) -> BTreeMap<String, String> {
	BTreeMap::from([
		("app".to_string(), BUCKET_APP_LABEL.to_string()),
		("ns".to_string(), agent.namespace.clone()),
		("stack".to_string(), agent.stack_prefix.clone()),
	])
}

/// An additive IAM grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IamBinding {
	pub resource: String,
	pub role: String,
	pub member: String,
}

/// Workload identity binding, plus bucket access when enabled.
pub fn agent_iam_bindings(config: &GantryConfig, gsa_email: &str) -> ProvisionResult<Vec<IamBinding>> {
	let project = config.gcp.require_project()?;
	let agent = &config.agent;

	let mut bindings = Vec::with_capacity(2);
	if agent.grant_bucket_roles {
		bindings.push(IamBinding {
			resource: agent.bucket_name(),
			role: STORAGE_OBJECT_ADMIN_ROLE.to_string(),
			member: iam_member(gsa_email),
		});
	}
	bindings.push(IamBinding {
		resource: service_account_resource_id(project, gsa_email),
		role: WORKLOAD_IDENTITY_USER_ROLE.to_string(),
		member: workload_identity_member(project, &agent.namespace, &agent.ksa_name()),
	});
	Ok(bindings)
}

/// Objects applied before the chart is installed.
#[derive(Debug, Clone)]
pub struct AgentManifests {
	pub namespace: Namespace,
	pub service_account: ServiceAccount,
	pub tls_secret: Option<Secret>,
}

impl AgentManifests {
	/// Multi-document YAML in apply order.
	pub fn to_yaml(&self) -> ProvisionResult<String> {
		let mut out = String::new();
		push_document(&mut out, &self.namespace)?;
		push_document(&mut out, &self.service_account)?;
		if let Some(secret) = &self.tls_secret {
			push_document(&mut out, secret)?;
		}
		Ok(out)
	}
}

fn push_document<T: Serialize>(out: &mut String, object: &T) -> ProvisionResult<()> {
	let text = serde_yaml::to_string(object).map_err(RenderError::from)?;
	out.push_str("---\n");
	out.push_str(&text);
	Ok(())
}

/// Builds the namespace, the annotated service account and, when TLS is
/// configured and material is supplied, the TLS secret.
pub fn agent_manifests(
	agent: &AgentConfig,
	gsa_email: &str,
	tls: Option<&TlsMaterial>,
) -> AgentManifests {
	let namespace = Namespace {
		metadata: ObjectMeta {
			name: Some(agent.namespace.clone()),
			..Default::default()
		},
		..Default::default()
	};

	let service_account = ServiceAccount {
		metadata: ObjectMeta {
			name: Some(agent.ksa_name()),
			namespace: Some(agent.namespace.clone()),
			annotations: Some(BTreeMap::from([(
				GSA_ANNOTATION.to_string(),
				gsa_email.to_string(),
			)])),
			labels: Some(BTreeMap::from([
				("app".to_string(), AGENT_APP_LABEL.to_string()),
				("stack".to_string(), agent.stack_prefix.clone()),
			])),
			..Default::default()
		},
		..Default::default()
	};

	let tls_secret = match (agent.tls_secret_name(), tls) {
		(Some(name), Some(material)) => Some(Secret {
			metadata: ObjectMeta {
				name: Some(name),
				namespace: Some(agent.namespace.clone()),
				..Default::default()
			},
			type_: Some("Opaque".to_string()),
			string_data: Some(BTreeMap::from([
				("tls.crt".to_string(), material.tls_crt.expose().clone()),
				("tls.key".to_string(), material.tls_key.expose().clone()),
				("ca.crt".to_string(), material.ca_crt.clone()),
			])),
			..Default::default()
		}),
		(Some(name), None) => {
			debug!(secret = %name, "no TLS material supplied, skipping secret");
			None
		}
		_ => None,
	};

	AgentManifests {
		namespace,
		service_account,
		tls_secret,
	}
}
