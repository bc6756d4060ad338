// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Kubeconfig documents for GKE clusters.
//!
//! Every document holds exactly one cluster, one context and one user, all
//! sharing a single identifier. Two naming conventions exist and each has its
//! own entry point:
//!
//! - [`render_static`] / [`render_bearer_token`]: identifier `gke_{cluster}`,
//!   credentials embedded in the document
//! - [`render_exec`]: identifier is the bare cluster name, credentials come
//!   from `gke-gcloud-auth-plugin` at connection time
//!
//! Rendering never fails. Empty inputs produce a well-formed document with
//! empty fields; rejecting those is left to kubectl and client libraries.

use serde::{Deserialize, Serialize};

use crate::error::RenderResult;

/// Kubeconfig schema version.
pub const KUBECONFIG_API_VERSION: &str = "v1";

/// API version of the client authentication exec protocol.
pub const EXEC_API_VERSION: &str = "client.authentication.k8s.io/v1";

/// Credential helper shipped with the Google Cloud SDK.
pub const GKE_AUTH_PLUGIN: &str = "gke-gcloud-auth-plugin";

/// Shown by kubectl when the credential helper is missing.
pub const GKE_AUTH_INSTALL_HINT: &str = "Install gke-gcloud-auth-plugin: https://cloud.google.com/blog/products/containers-kubernetes/kubectl-auth-changes-in-gke";

/// Which credential style a kubeconfig carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KubeconfigStyle {
	/// Embedded CA data, identifier `gke_{cluster}`.
	Static,
	/// `gke-gcloud-auth-plugin`, identifier `{cluster}`.
	Exec,
}

impl KubeconfigStyle {
	/// The shared context/cluster/user identifier for `cluster_name`.
	pub fn identifier(self, cluster_name: &str) -> String {
		match self {
			KubeconfigStyle::Static => format!("gke_{cluster_name}"),
			KubeconfigStyle::Exec => cluster_name.to_string(),
		}
	}

	pub fn render(self, cluster_name: &str, endpoint: &str, ca_cert_b64: &str) -> String {
		match self {
			KubeconfigStyle::Static => render_static(cluster_name, endpoint, ca_cert_b64),
			KubeconfigStyle::Exec => render_exec(cluster_name, endpoint, ca_cert_b64),
		}
	}
}

/// Kubeconfig with the user's credential set to the cluster CA data.
pub fn render_static(cluster_name: &str, endpoint: &str, ca_cert_b64: &str) -> String {
	let id = KubeconfigStyle::Static.identifier(cluster_name);
	let user = AuthInfo {
		certificate_authority_data: Some(ca_cert_b64.to_string()),
		..Default::default()
	};
	Kubeconfig::single(&id, endpoint, ca_cert_b64, user).emit()
}

/// Kubeconfig that authenticates through `gke-gcloud-auth-plugin`.
pub fn render_exec(cluster_name: &str, endpoint: &str, ca_cert_b64: &str) -> String {
	let id = KubeconfigStyle::Exec.identifier(cluster_name);
	let user = AuthInfo {
		exec: Some(ExecConfig::gke_auth_plugin()),
		..Default::default()
	};
	Kubeconfig::single(&id, endpoint, ca_cert_b64, user).emit()
}

/// Kubeconfig authenticating with a static bearer token.
pub fn render_bearer_token(
	cluster_name: &str,
	endpoint: &str,
	ca_cert_b64: &str,
	token: &str,
) -> String {
	let id = KubeconfigStyle::Static.identifier(cluster_name);
	let user = AuthInfo {
		token: Some(token.to_string()),
		..Default::default()
	};
	Kubeconfig::single(&id, endpoint, ca_cert_b64, user).emit()
}

/// A client configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kubeconfig {
	#[serde(rename = "apiVersion")]
	pub api_version: String,
	pub kind: String,
	#[serde(rename = "current-context")]
	pub current_context: String,
	pub clusters: Vec<NamedCluster>,
	pub contexts: Vec<NamedContext>,
	pub users: Vec<NamedUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCluster {
	pub name: String,
	pub cluster: Cluster,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
	pub server: String,
	#[serde(rename = "certificate-authority-data")]
	pub certificate_authority_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedContext {
	pub name: String,
	pub context: Context,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
	pub cluster: String,
	pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedUser {
	pub name: String,
	pub user: AuthInfo,
}

/// User credentials. Exactly one field is set for documents built here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
	#[serde(
		rename = "certificate-authority-data",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub certificate_authority_data: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exec: Option<ExecConfig>,
}

/// Delegated credential command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecConfig {
	pub api_version: String,
	pub command: String,
	pub install_hint: String,
	pub provide_cluster_info: bool,
	pub interactive_mode: InteractiveMode,
}

impl ExecConfig {
	/// `gke-gcloud-auth-plugin`, never prompting.
	pub fn gke_auth_plugin() -> Self {
		Self {
			api_version: EXEC_API_VERSION.to_string(),
			command: GKE_AUTH_PLUGIN.to_string(),
			install_hint: GKE_AUTH_INSTALL_HINT.to_string(),
			provide_cluster_info: true,
			interactive_mode: InteractiveMode::Never,
		}
	}
}

/// Whether an exec plugin may read from the user's terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractiveMode {
	#[default]
	Never,
	IfAvailable,
	Always,
}

impl Kubeconfig {
	/// One cluster, one context and one user, all named `id`.
	pub fn single(id: &str, endpoint: &str, ca_cert_b64: &str, user: AuthInfo) -> Self {
		Self {
			api_version: KUBECONFIG_API_VERSION.to_string(),
			kind: "Config".to_string(),
			current_context: id.to_string(),
			clusters: vec![NamedCluster {
				name: id.to_string(),
				cluster: Cluster {
					server: format!("https://{endpoint}"),
					certificate_authority_data: ca_cert_b64.to_string(),
				},
			}],
			contexts: vec![NamedContext {
				name: id.to_string(),
				context: Context {
					cluster: id.to_string(),
					user: id.to_string(),
				},
			}],
			users: vec![NamedUser {
				name: id.to_string(),
				user,
			}],
		}
	}

	pub fn from_yaml(text: &str) -> RenderResult<Self> {
		Ok(serde_yaml::from_str(text)?)
	}

	pub fn to_yaml(&self) -> RenderResult<String> {
		Ok(serde_yaml::to_string(self)?)
	}

	pub fn to_json(&self) -> RenderResult<String> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	/// YAML for the render functions. Only strings, booleans and unit enums
	/// are serialized here.
	fn emit(&self) -> String {
		self.to_yaml().unwrap_or_else(|_| "{}".to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_static_identifiers() {
		let doc = Kubeconfig::from_yaml(&render_static("c1", "1.2.3.4", "BASE64CA")).unwrap();
		assert_eq!(doc.current_context, "gke_c1");
		assert_eq!(doc.clusters[0].name, "gke_c1");
		assert_eq!(doc.contexts[0].name, "gke_c1");
		assert_eq!(doc.contexts[0].context.cluster, "gke_c1");
		assert_eq!(doc.contexts[0].context.user, "gke_c1");
		assert_eq!(doc.users[0].name, "gke_c1");
	}

	#[test]
	fn test_static_embeds_ca() {
		let doc = Kubeconfig::from_yaml(&render_static("c1", "1.2.3.4", "BASE64CA")).unwrap();
		assert_eq!(doc.clusters[0].cluster.server, "https://1.2.3.4");
		assert_eq!(doc.clusters[0].cluster.certificate_authority_data, "BASE64CA");
		assert_eq!(
			doc.users[0].user.certificate_authority_data.as_deref(),
			Some("BASE64CA")
		);
		assert!(doc.users[0].user.exec.is_none());
	}

	#[test]
	fn test_exec_identifiers_are_bare() {
		let doc = Kubeconfig::from_yaml(&render_exec("c1", "1.2.3.4", "BASE64CA")).unwrap();
		assert_eq!(doc.current_context, "c1");
		assert_eq!(doc.clusters[0].name, "c1");
		assert_eq!(doc.contexts[0].context.user, "c1");
		assert_eq!(doc.users[0].name, "c1");
	}

	#[test]
	fn test_exec_delegates_credentials() {
		let doc = Kubeconfig::from_yaml(&render_exec("c1", "1.2.3.4", "BASE64CA")).unwrap();
		let user = &doc.users[0].user;
		assert!(user.certificate_authority_data.is_none());
		assert!(user.token.is_none());
		let exec = user.exec.as_ref().unwrap();
		assert_eq!(exec.command, "gke-gcloud-auth-plugin");
		assert_eq!(exec.api_version, "client.authentication.k8s.io/v1");
		assert!(exec.provide_cluster_info);
		assert_eq!(exec.interactive_mode, InteractiveMode::Never);
		assert!(exec.install_hint.contains("gke-gcloud-auth-plugin"));
	}

	#[test]
	fn test_bearer_token() {
		let doc =
			Kubeconfig::from_yaml(&render_bearer_token("c1", "1.2.3.4", "CA", "s3cr3t")).unwrap();
		assert_eq!(doc.current_context, "gke_c1");
		assert_eq!(doc.users[0].user.token.as_deref(), Some("s3cr3t"));
		assert!(doc.users[0].user.exec.is_none());
	}

	#[test]
	fn test_empty_inputs_still_parse() {
		let doc = Kubeconfig::from_yaml(&render_static("", "", "")).unwrap();
		assert_eq!(doc.current_context, "gke_");
		assert_eq!(doc.clusters[0].cluster.server, "https://");
		assert_eq!(doc.clusters[0].cluster.certificate_authority_data, "");

		let doc = Kubeconfig::from_yaml(&render_exec("", "", "")).unwrap();
		assert_eq!(doc.current_context, "");
	}

	#[test]
	fn test_style_dispatch() {
		assert_eq!(
			KubeconfigStyle::Static.render("c", "e", "ca"),
			render_static("c", "e", "ca")
		);
		assert_eq!(
			KubeconfigStyle::Exec.render("c", "e", "ca"),
			render_exec("c", "e", "ca")
		);
		assert_eq!(KubeconfigStyle::Static.identifier("prod"), "gke_prod");
		assert_eq!(KubeconfigStyle::Exec.identifier("prod"), "prod");
	}

	#[test]
	fn test_json_output() {
		let doc = Kubeconfig::from_yaml(&render_exec("c1", "1.2.3.4", "CA")).unwrap();
		let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
		assert_eq!(json["current-context"], "c1");
		assert_eq!(json["users"][0]["user"]["exec"]["interactiveMode"], "Never");
		assert_eq!(json["clusters"][0]["cluster"]["certificate-authority-data"], "CA");
		assert!(json["users"][0]["user"].get("token").is_none());
	}

	#[test]
	fn test_yaml_round_trips_ambiguous_scalars() {
		for value in ["true", "null", "~", "1.0", "0x1F", "- item", "a: b", "#x", ""] {
			let text = render_static(value, value, value);
			let doc = Kubeconfig::from_yaml(&text).unwrap();
			assert_eq!(doc.current_context, format!("gke_{value}"));
			assert_eq!(doc.clusters[0].cluster.certificate_authority_data, value);
			assert_eq!(doc.users[0].user.certificate_authority_data.as_deref(), Some(value));
		}
	}

	#[test]
	fn test_to_yaml_matches_render() {
		let doc = Kubeconfig::from_yaml(&render_exec("c1", "1.2.3.4", "CA")).unwrap();
		assert_eq!(doc.to_yaml().unwrap(), render_exec("c1", "1.2.3.4", "CA"));
		assert!(doc.to_yaml().unwrap().starts_with("apiVersion: v1\n"));
	}

	proptest! {
		/// Arbitrary inputs produce documents that parse back to the same values.
		#[test]
		fn rendered_documents_parse_back(
			name in "[ -~]{0,24}",
			endpoint in "[ -~]{0,24}",
			ca in "[A-Za-z0-9+/=]{0,64}",
		) {
			let doc = Kubeconfig::from_yaml(&render_static(&name, &endpoint, &ca)).unwrap();
			prop_assert_eq!(&doc.current_context, &format!("gke_{name}"));
			prop_assert_eq!(&doc.clusters[0].cluster.server, &format!("https://{endpoint}"));
			prop_assert_eq!(&doc.clusters[0].cluster.certificate_authority_data, &ca);

			let doc = Kubeconfig::from_yaml(&render_exec(&name, &endpoint, &ca)).unwrap();
			prop_assert_eq!(&doc.users[0].name, &name);
		}
	}
}
