// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::GantryConfigLayer;
use crate::sections::{
	AgentConfigLayer, AuthorizedNetworkLayer, ClusterConfigLayer, GcpConfigLayer,
	LoggingConfigLayer, OtelConfigLayer, ReleaseChannel,
};

pub const SYSTEM_CONFIG_FILE: &str = "/etc/gantry/config.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	SystemFile = 20,
	UserFile = 30,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<GantryConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<GantryConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(GantryConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
	precedence: Precedence,
}

impl TomlSource {
	/// An explicitly named file, ranked like the user file.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			precedence: Precedence::UserFile,
		}
	}

	pub fn system() -> Self {
		Self {
			path: PathBuf::from(SYSTEM_CONFIG_FILE),
			precedence: Precedence::SystemFile,
		}
	}

	/// `$XDG_CONFIG_HOME/gantry/config.toml`, if a config directory exists.
	pub fn user() -> Option<Self> {
		dirs::config_dir().map(|dir| Self::new(dir.join("gantry").join("config.toml")))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		match self.precedence {
			Precedence::SystemFile => "system-config",
			_ => "user-config",
		}
	}

	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<GantryConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(GantryConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: GantryConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: GANTRY_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<GantryConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(GantryConfigLayer {
			gcp: Some(load_gcp_from_env()),
			cluster: Some(load_cluster_from_env()?),
			agent: Some(load_agent_from_env()),
			otel: Some(load_otel_from_env()),
			logging: Some(load_logging_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_u32(name: &str) -> Result<Option<u32>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u32 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_list(name: &str) -> Option<Vec<String>> {
	env_var(name).map(|s| {
		s.split(',')
			.map(|s| s.trim().to_string())
			.filter(|s| !s.is_empty())
			.collect()
	})
}

/// `key=value,key=value`
fn env_map(name: &str) -> Result<Option<BTreeMap<String, String>>, ConfigError> {
	let Some(entries) = env_list(name) else {
		return Ok(None);
	};
	entries
		.into_iter()
		.map(|entry| match entry.split_once('=') {
			Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.trim().to_string())),
			_ => Err(ConfigError::invalid_value(
				name,
				format!("expected key=value, got '{entry}'"),
			)),
		})
		.collect::<Result<BTreeMap<_, _>, _>>()
		.map(Some)
}

fn load_gcp_from_env() -> GcpConfigLayer {
	GcpConfigLayer {
		project: env_var("GANTRY_GCP_PROJECT"),
		region: env_var("GANTRY_GCP_REGION"),
	}
}

fn load_cluster_from_env() -> Result<ClusterConfigLayer, ConfigError> {
	let release_channel = env_var("GANTRY_CLUSTER_RELEASE_CHANNEL")
		.map(|v| {
			v.parse::<ReleaseChannel>()
				.map_err(|e| ConfigError::invalid_value("GANTRY_CLUSTER_RELEASE_CHANNEL", e))
		})
		.transpose()?;

	// CIDR blocks only; display names come from the config file.
	let master_authorized_networks = env_list("GANTRY_CLUSTER_AUTHORIZED_NETWORKS").map(|cidrs| {
		cidrs
			.into_iter()
			.map(|cidr| AuthorizedNetworkLayer {
				cidr_block: Some(cidr),
				display_name: None,
			})
			.collect()
	});

	Ok(ClusterConfigLayer {
		project_id: env_var("GANTRY_CLUSTER_PROJECT"),
		location: env_var("GANTRY_CLUSTER_LOCATION"),
		name: env_var("GANTRY_CLUSTER_NAME"),
		release_channel,
		resource_labels: env_map("GANTRY_CLUSTER_RESOURCE_LABELS")?,
		network: env_var("GANTRY_CLUSTER_NETWORK"),
		subnetwork: env_var("GANTRY_CLUSTER_SUBNETWORK"),
		enable_private_nodes: env_bool("GANTRY_CLUSTER_ENABLE_PRIVATE_NODES"),
		enable_private_endpoint: env_bool("GANTRY_CLUSTER_ENABLE_PRIVATE_ENDPOINT"),
		master_ipv4_cidr_block: env_var("GANTRY_CLUSTER_MASTER_IPV4_CIDR_BLOCK"),
		enable_ip_alias: env_bool("GANTRY_CLUSTER_ENABLE_IP_ALIAS"),
		cluster_ipv4_cidr_block: env_var("GANTRY_CLUSTER_CLUSTER_IPV4_CIDR_BLOCK"),
		services_ipv4_cidr_block: env_var("GANTRY_CLUSTER_SERVICES_IPV4_CIDR_BLOCK"),
		master_authorized_networks,
		enable_autopilot: env_bool("GANTRY_CLUSTER_ENABLE_AUTOPILOT"),
		node_count: env_u32("GANTRY_CLUSTER_NODE_COUNT")?,
		min_count: env_u32("GANTRY_CLUSTER_MIN_COUNT")?,
		max_count: env_u32("GANTRY_CLUSTER_MAX_COUNT")?,
		machine_type: env_var("GANTRY_CLUSTER_MACHINE_TYPE"),
		disk_size_gb: env_u32("GANTRY_CLUSTER_DISK_SIZE_GB")?,
		disk_type: env_var("GANTRY_CLUSTER_DISK_TYPE"),
		oauth_scopes: env_list("GANTRY_CLUSTER_OAUTH_SCOPES"),
		node_service_account: env_var("GANTRY_CLUSTER_NODE_SERVICE_ACCOUNT"),
		preemptible_nodes: env_bool("GANTRY_CLUSTER_PREEMPTIBLE_NODES"),
		deletion_protection: env_bool("GANTRY_CLUSTER_DELETION_PROTECTION"),
		enable_workload_identity: env_bool("GANTRY_CLUSTER_ENABLE_WORKLOAD_IDENTITY"),
		gcs_bucket_name: env_var("GANTRY_CLUSTER_GCS_BUCKET_NAME"),
		gcs_bucket_region: env_var("GANTRY_CLUSTER_GCS_BUCKET_REGION"),
		gcs_bucket_storage_class: env_var("GANTRY_CLUSTER_GCS_BUCKET_STORAGE_CLASS"),
	})
}

fn load_agent_from_env() -> AgentConfigLayer {
	AgentConfigLayer {
		namespace: env_var("GANTRY_AGENT_NAMESPACE"),
		stack_prefix: env_var("GANTRY_AGENT_STACK_PREFIX"),
		kubeconfig_secret_id: env_var("GANTRY_AGENT_KUBECONFIG_SECRET_ID"),
		bucket_name: env_var("GANTRY_AGENT_BUCKET_NAME"),
		force_destroy_bucket: env_bool("GANTRY_AGENT_FORCE_DESTROY_BUCKET"),
		gsa_email: env_var("GANTRY_AGENT_GSA_EMAIL"),
		ksa_name: env_var("GANTRY_AGENT_KSA_NAME"),
		grant_bucket_roles: env_bool("GANTRY_AGENT_GRANT_BUCKET_ROLES"),
		gcp_tls_cert_secret_id: env_var("GANTRY_AGENT_GCP_TLS_CERT_SECRET_ID"),
		k8s_tls_secret_name: env_var("GANTRY_AGENT_K8S_TLS_SECRET_NAME"),
		chart_name: env_var("GANTRY_AGENT_CHART_NAME"),
		chart_repo: env_var("GANTRY_AGENT_CHART_REPO"),
		chart_version: env_var("GANTRY_AGENT_CHART_VERSION"),
		values_template_path: env_var("GANTRY_AGENT_VALUES_TEMPLATE").map(PathBuf::from),
		agent_key_secret_id: env_var("GANTRY_AGENT_KEY_SECRET_ID"),
		virtual_cluster_id_secret_id: env_var("GANTRY_AGENT_VIRTUAL_CLUSTER_ID_SECRET_ID"),
		dns_record_name: env_var("GANTRY_AGENT_DNS_RECORD_NAME"),
		warpstream_region: env_var("GANTRY_AGENT_WARPSTREAM_REGION"),
	}
}

fn load_otel_from_env() -> OtelConfigLayer {
	OtelConfigLayer {
		apps: env_list("GANTRY_OTEL_APPS")
			.map(|paths| paths.into_iter().map(PathBuf::from).collect()),
		defaults_path: env_var("GANTRY_OTEL_DEFAULTS").map(PathBuf::from),
	}
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("GANTRY_LOG_LEVEL"),
		json: env_bool("GANTRY_LOG_JSON"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::UserFile);
		assert!(Precedence::UserFile > Precedence::SystemFile);
		assert!(Precedence::SystemFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.gcp.is_none());
		assert!(layer.cluster.is_none());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let source = TomlSource::new("/nonexistent/gantry.toml");
		let layer = source.load().unwrap();
		assert!(layer.agent.is_none());
	}

	#[test]
	fn test_toml_source_reads_sections() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[gcp]
project = "acme-lab"
region = "us-east1"

[cluster]
name = "ws-gke"
release_channel = "STABLE"

[agent]
namespace = "streams"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.gcp.unwrap().project.as_deref(), Some("acme-lab"));
		let cluster = layer.cluster.unwrap();
		assert_eq!(cluster.name.as_deref(), Some("ws-gke"));
		assert_eq!(cluster.release_channel, Some(ReleaseChannel::Stable));
		assert_eq!(layer.agent.unwrap().namespace.as_deref(), Some("streams"));
	}

	#[test]
	fn test_toml_source_reads_otel_apps() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[otel]
apps = ["apps/prod.yaml", "apps/lab.yaml"]
defaults_path = "otel/defaults.yaml"
"#
		)
		.unwrap();

		let otel = TomlSource::new(file.path())
			.load()
			.unwrap()
			.otel
			.unwrap()
			.finalize();
		assert_eq!(otel.apps.len(), 2);
		assert_eq!(otel.apps[1], PathBuf::from("apps/lab.yaml"));
		assert_eq!(otel.defaults_path, PathBuf::from("otel/defaults.yaml"));
	}

	#[test]
	fn test_toml_source_parse_error_names_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[gcp\nproject = ").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
		assert!(err.to_string().contains(&file.path().display().to_string()));
	}

	#[test]
	fn test_system_source_rank() {
		let source = TomlSource::system();
		assert_eq!(source.precedence(), Precedence::SystemFile);
		assert_eq!(source.path(), Path::new(SYSTEM_CONFIG_FILE));
	}

	#[test]
	fn test_env_u32_rejects_garbage() {
		std::env::set_var("GANTRY_TEST_SOURCES_U32", "lots");
		let err = env_u32("GANTRY_TEST_SOURCES_U32").unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { .. }));
		std::env::remove_var("GANTRY_TEST_SOURCES_U32");
	}

	#[test]
	fn test_env_list_trims_and_skips_empty() {
		std::env::set_var("GANTRY_TEST_SOURCES_LIST", " a, b ,,c ");
		assert_eq!(
			env_list("GANTRY_TEST_SOURCES_LIST"),
			Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
		);
		std::env::remove_var("GANTRY_TEST_SOURCES_LIST");
	}

	#[test]
	fn test_env_map_parses_pairs() {
		std::env::set_var("GANTRY_TEST_SOURCES_MAP", "product=warpstream, environment=lab");
		let map = env_map("GANTRY_TEST_SOURCES_MAP").unwrap().unwrap();
		assert_eq!(map.get("product").map(String::as_str), Some("warpstream"));
		assert_eq!(map.get("environment").map(String::as_str), Some("lab"));
		std::env::remove_var("GANTRY_TEST_SOURCES_MAP");
	}

	#[test]
	fn test_env_map_rejects_bare_key() {
		std::env::set_var("GANTRY_TEST_SOURCES_BAD_MAP", "product");
		assert!(env_map("GANTRY_TEST_SOURCES_BAD_MAP").is_err());
		std::env::remove_var("GANTRY_TEST_SOURCES_BAD_MAP");
	}

	#[test]
	fn test_env_bool_variants() {
		std::env::set_var("GANTRY_TEST_SOURCES_BOOL", "TRUE");
		assert_eq!(env_bool("GANTRY_TEST_SOURCES_BOOL"), Some(true));
		std::env::set_var("GANTRY_TEST_SOURCES_BOOL", "no");
		assert_eq!(env_bool("GANTRY_TEST_SOURCES_BOOL"), Some(false));
		std::env::remove_var("GANTRY_TEST_SOURCES_BOOL");
		assert_eq!(env_bool("GANTRY_TEST_SOURCES_BOOL"), None);
	}
}
