// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenTelemetry collector deployments, one per app descriptor.
//!
//! Each descriptor is a YAML file naming the cluster's kubeconfig secret, the
//! collector chart and any extra manifests:
//!
//! ```yaml
//! name: prod-eu            # defaults to the file stem
//! namespace: observability # default
//! secretManager:
//!   secret: prod-eu-kubeconfig   # or projects/{p}/secrets/{s}
//!   version: "3"                 # default: latest
//!   isBase64: true
//! helm:
//!   repo: https://open-telemetry.github.io/opentelemetry-helm-charts
//!   chart: opentelemetry-collector
//!   version: 0.97.1
//!   values: { mode: deployment }
//! manifests:
//!   - otel/extra/service-monitor.yaml
//! ```
//!
//! Chart values are layered as shared defaults, then the app's own values.

use std::path::{Path, PathBuf};

use base64::prelude::*;
use futures::future::try_join_all;
use gantry_config::{GantryConfig, SecretString};
use gantry_render::{merge, parse_yaml, parse_yaml_documents, Tree};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::collaborators::{SecretStore, LATEST_VERSION};
use crate::error::{ProvisionError, ProvisionResult};
use crate::values::value_kind;

pub const DEFAULT_OTEL_NAMESPACE: &str = "observability";

/// Where a cluster's kubeconfig is kept in Secret Manager.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeconfigSecretRef {
	/// Secret id, or a full `projects/{project}/secrets/{id}` path.
	pub secret: String,
	#[serde(default)]
	pub version: Option<String>,
	/// The payload is base64 text wrapping the kubeconfig.
	#[serde(default)]
	pub is_base64: bool,
}

impl KubeconfigSecretRef {
	/// Project and secret id, taking the project from a full path when given.
	pub fn locate<'a>(&'a self, default_project: Option<&'a str>) -> (Option<&'a str>, &'a str) {
		match split_secret_path(&self.secret) {
			Some((project, secret_id)) => (Some(project), secret_id),
			None => (default_project, self.secret.as_str()),
		}
	}

	pub fn version(&self) -> &str {
		self.version.as_deref().unwrap_or(LATEST_VERSION)
	}
}

fn split_secret_path(secret: &str) -> Option<(&str, &str)> {
	let rest = secret.strip_prefix("projects/")?;
	let (project, rest) = rest.split_once('/')?;
	let secret_id = rest.strip_prefix("secrets/")?;
	(!project.is_empty() && !secret_id.is_empty() && !secret_id.contains('/'))
		.then_some((project, secret_id))
}

/// Chart coordinates plus the app's own values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HelmChartRef {
	pub repo: String,
	pub chart: String,
	#[serde(default)]
	pub version: Option<String>,
	#[serde(default)]
	pub values: Tree,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppDescriptor {
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	namespace: Option<String>,
	secret_manager: KubeconfigSecretRef,
	helm: HelmChartRef,
	#[serde(default)]
	manifests: Vec<PathBuf>,
}

/// One collector deployment into one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct OtelApp {
	pub name: String,
	pub namespace: String,
	pub kubeconfig_secret: KubeconfigSecretRef,
	pub helm: HelmChartRef,
	/// Extra manifest files, relative to the working directory.
	pub manifests: Vec<PathBuf>,
}

impl OtelApp {
	/// Parses a descriptor. `path` supplies the default name and error context.
	pub fn from_yaml(path: &Path, text: &str) -> ProvisionResult<Self> {
		let descriptor: AppDescriptor =
			serde_yaml::from_str(text).map_err(|e| ProvisionError::InvalidAppDescriptor {
				path: path.to_path_buf(),
				message: e.to_string(),
			})?;

		let name = match descriptor.name.filter(|n| !n.is_empty()) {
			Some(name) => name,
			None => path
				.file_stem()
				.and_then(|stem| stem.to_str())
				.filter(|stem| !stem.is_empty())
				.map(str::to_string)
				.ok_or_else(|| ProvisionError::InvalidAppDescriptor {
					path: path.to_path_buf(),
					message: "no name and no usable file stem".to_string(),
				})?,
		};

		Ok(Self {
			name,
			namespace: descriptor
				.namespace
				.filter(|ns| !ns.is_empty())
				.unwrap_or_else(|| DEFAULT_OTEL_NAMESPACE.to_string()),
			kubeconfig_secret: descriptor.secret_manager,
			helm: descriptor.helm,
			manifests: descriptor.manifests,
		})
	}

	pub async fn load(path: &Path) -> ProvisionResult<Self> {
		let text = read_file(path).await?;
		Self::from_yaml(path, &text)
	}

	pub fn release_name(&self) -> String {
		format!("otel-{}", self.name)
	}

	/// Shared defaults with the app's values merged on top.
	pub fn values(&self, defaults: &Tree) -> Tree {
		merge(defaults, &self.helm.values)
	}

	pub fn release(&self, defaults: &Tree) -> HelmRelease {
		HelmRelease {
			name: self.release_name(),
			repo: self.helm.repo.clone(),
			chart: self.helm.chart.clone(),
			version: self.helm.version.clone(),
			namespace: self.namespace.clone(),
			values: self.values(defaults),
		}
	}
}

/// A chart install, ready to hand to Helm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HelmRelease {
	pub name: String,
	pub repo: String,
	pub chart: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
	pub namespace: String,
	pub values: Tree,
}

/// Everything applied to one cluster for one app.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtelDeployment {
	pub app: String,
	pub namespace: String,
	pub release: HelmRelease,
	pub extra_manifests: Vec<Tree>,
}

/// Sets `metadata.namespace` unless the manifest already names one.
///
/// A missing or non-mapping `metadata` becomes a mapping. An explicit
/// `namespace` key is kept even when it is null.
pub fn inject_namespace(mut manifest: Tree, namespace: &str) -> Tree {
	if !manifest.is_object() {
		warn!(kind = value_kind(&manifest), "manifest is not a mapping, leaving it as is");
		return manifest;
	}

	if let Value::Object(object) = &mut manifest {
		let metadata = object
			.entry("metadata")
			.or_insert_with(|| Value::Object(Map::new()));
		if !metadata.is_object() {
			*metadata = Value::Object(Map::new());
		}
		if let Value::Object(fields) = metadata {
			fields
				.entry("namespace")
				.or_insert_with(|| Value::String(namespace.to_string()));
		}
	}
	manifest
}

/// Reads the app's extra manifest files and places each document in the
/// app namespace. Document order follows file order.
pub async fn load_extra_manifests(app: &OtelApp) -> ProvisionResult<Vec<Tree>> {
	let texts = try_join_all(app.manifests.iter().map(|path| read_file(path))).await?;

	let mut manifests = Vec::new();
	for text in &texts {
		for document in parse_yaml_documents(text)? {
			manifests.push(inject_namespace(document, &app.namespace));
		}
	}
	Ok(manifests)
}

/// Shared chart values. An empty file yields `{}`.
pub async fn load_otel_defaults(path: &Path) -> ProvisionResult<Tree> {
	let text = read_file(path).await?;
	Ok(parse_yaml(&text)?)
}

/// Loads every configured app descriptor.
pub async fn load_otel_apps(config: &GantryConfig) -> ProvisionResult<Vec<OtelApp>> {
	if config.otel.apps.is_empty() {
		warn!("no otel apps configured");
		return Ok(Vec::new());
	}
	try_join_all(config.otel.apps.iter().map(|path| OtelApp::load(path))).await
}

/// Release and extra manifests for one app.
#[instrument(skip(app, defaults), fields(app = %app.name))]
pub async fn plan_otel_deployment(app: &OtelApp, defaults: &Tree) -> ProvisionResult<OtelDeployment> {
	let extra_manifests = load_extra_manifests(app).await?;
	let release = app.release(defaults);
	info!(
		release = %release.name,
		namespace = %app.namespace,
		extra_manifests = extra_manifests.len(),
		"otel deployment planned"
	);
	Ok(OtelDeployment {
		app: app.name.clone(),
		namespace: app.namespace.clone(),
		release,
		extra_manifests,
	})
}

/// Fetches the app's cluster kubeconfig, decoding base64 payloads.
///
/// The `gcp` project is only required when the secret is not a full path.
pub async fn resolve_app_kubeconfig(
	app: &OtelApp,
	config: &GantryConfig,
	store: &dyn SecretStore,
) -> ProvisionResult<SecretString> {
	let secret = &app.kubeconfig_secret;
	let (project, secret_id) = secret.locate(config.gcp.project.as_deref());
	let project = match project {
		Some(project) => project,
		None => config.gcp.require_project()?,
	};

	debug!(app = %app.name, secret_id, version = secret.version(), "fetching kubeconfig");
	let payload = store.secret_data(project, secret_id, secret.version()).await?;
	if !secret.is_base64 {
		return Ok(payload);
	}
	decode_kubeconfig(secret_id, payload.expose()).map(SecretString::new)
}

fn decode_kubeconfig(secret_id: &str, payload: &str) -> ProvisionResult<String> {
	let invalid = |message: String| ProvisionError::InvalidSecretEncoding {
		secret_id: secret_id.to_string(),
		message,
	};
	let compact: String = payload.split_whitespace().collect();
	let bytes = BASE64_STANDARD
		.decode(compact)
		.map_err(|e| invalid(e.to_string()))?;
	String::from_utf8(bytes).map_err(|_| invalid("decoded payload is not UTF-8".to_string()))
}

async fn read_file(path: &Path) -> ProvisionResult<String> {
	tokio::fs::read_to_string(path)
		.await
		.map_err(|source| ProvisionError::Io {
			path: path.to_path_buf(),
			source,
		})
}
