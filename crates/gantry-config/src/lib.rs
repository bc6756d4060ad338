// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for Gantry deployments.
//!
//! This crate provides:
//! - Layered configuration from defaults, TOML files and the environment
//! - Typed sections for the GCP project, the GKE cluster and the agent deployment
//! - Consistent environment variable naming (`GANTRY_*`)
//!
//! # Usage
//!
//! ```ignore
//! use gantry_config::load_config;
//!
//! let config = load_config()?;
//! println!("deploying into {}", config.agent.namespace);
//! ```

pub mod error;
pub mod layer;
pub mod secret;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::GantryConfigLayer;
pub use secret::{load_secret_env, Secret, SecretEnvError, SecretString, REDACTED};
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct GantryConfig {
	pub gcp: GcpConfig,
	pub cluster: ClusterConfig,
	pub agent: AgentConfig,
	pub otel: OtelConfig,
	pub logging: LoggingConfig,
}

impl GantryConfig {
	/// Project that owns the cluster, falling back to `gcp.project`.
	pub fn cluster_project(&self) -> Result<&str, ConfigError> {
		match self.cluster.project_id.as_deref() {
			Some(project) => Ok(project),
			None => self.gcp.require_project(),
		}
	}

	/// Cluster location, falling back to `gcp.region`.
	pub fn cluster_location(&self) -> Result<&str, ConfigError> {
		match self.cluster.location.as_deref() {
			Some(location) => Ok(location),
			None => self.gcp.require_region(),
		}
	}

	/// Workload identity pool, `{project}.svc.id.goog`.
	pub fn workload_pool(&self) -> Result<String, ConfigError> {
		Ok(format!("{}.svc.id.goog", self.cluster_project()?))
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`GANTRY_*`)
/// 2. User config file (`$XDG_CONFIG_HOME/gantry/config.toml`)
/// 3. System config file (`/etc/gantry/config.toml`)
/// 4. Built-in defaults
pub fn load_config() -> Result<GantryConfig, ConfigError> {
	let mut sources: Vec<Box<dyn ConfigSource>> =
		vec![Box::new(DefaultsSource), Box::new(TomlSource::system())];
	if let Some(user) = TomlSource::user() {
		sources.push(Box::new(user));
	}
	sources.push(Box::new(EnvSource));

	load_from_sources(sources)
}

/// Load configuration with a custom config file in place of the user file.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<GantryConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];

	load_from_sources(sources)
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<GantryConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = GantryConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: GantryConfigLayer) -> Result<GantryConfig, ConfigError> {
	let gcp = layer.gcp.unwrap_or_default().finalize();
	let cluster = layer.cluster.unwrap_or_default().finalize();
	let agent = layer.agent.unwrap_or_default().finalize();
	let otel = layer.otel.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	cluster.validate()?;

	info!(
		project = gcp.project.as_deref().unwrap_or("<unset>"),
		region = gcp.region.as_deref().unwrap_or("<unset>"),
		cluster = %cluster.name,
		release_channel = %cluster.release_channel,
		namespace = %agent.namespace,
		stack_prefix = %agent.stack_prefix,
		tls_enabled = agent.tls_enabled(),
		otel_apps = otel.apps.len(),
		"Gantry configuration loaded"
	);

	Ok(GantryConfig {
		gcp,
		cluster,
		agent,
		otel,
		logging,
	})
}
