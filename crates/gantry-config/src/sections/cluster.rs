// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! GKE cluster configuration section.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_CLUSTER_NAME: &str = "gke-cluster";
pub const DEFAULT_MACHINE_TYPE: &str = "e2-standard-4";
pub const DEFAULT_DISK_SIZE_GB: u32 = 100;
pub const DEFAULT_DISK_TYPE: &str = "pd-balanced";
pub const DEFAULT_BUCKET_STORAGE_CLASS: &str = "STANDARD";

/// OAuth scopes granted to node pool VMs when none are configured.
pub const DEFAULT_OAUTH_SCOPES: &[&str] = &[
	"https://www.googleapis.com/auth/cloud-platform",
	"https://www.googleapis.com/auth/compute",
	"https://www.googleapis.com/auth/devstorage.read_write",
	"https://www.googleapis.com/auth/logging.write",
	"https://www.googleapis.com/auth/monitoring",
];

/// Labels stamped on the cluster when none are configured.
pub const DEFAULT_RESOURCE_LABELS: &[(&str, &str)] = &[
	("product", "warpstream"),
	("environment", "lab"),
	("cluster_id", "1"),
];

/// GKE release channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReleaseChannel {
	Rapid,
	#[default]
	Regular,
	Stable,
}

impl ReleaseChannel {
	pub fn as_str(self) -> &'static str {
		match self {
			ReleaseChannel::Rapid => "RAPID",
			ReleaseChannel::Regular => "REGULAR",
			ReleaseChannel::Stable => "STABLE",
		}
	}
}

impl fmt::Display for ReleaseChannel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ReleaseChannel {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"RAPID" => Ok(ReleaseChannel::Rapid),
			"REGULAR" => Ok(ReleaseChannel::Regular),
			"STABLE" => Ok(ReleaseChannel::Stable),
			other => Err(format!(
				"unknown release channel '{other}' (expected RAPID, REGULAR or STABLE)"
			)),
		}
	}
}

/// A CIDR allowed to reach the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedNetwork {
	pub cidr_block: String,
	pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AuthorizedNetworkLayer {
	#[serde(default)]
	pub cidr_block: Option<String>,
	#[serde(default)]
	pub display_name: Option<String>,
}

/// Node pool sizing for Standard (non-Autopilot) clusters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePoolConfig {
	pub node_count: u32,
	pub min_count: u32,
	pub max_count: u32,
	pub machine_type: String,
	pub disk_size_gb: u32,
	pub disk_type: String,
	pub oauth_scopes: Vec<String>,
	pub service_account: Option<String>,
	pub preemptible: bool,
}

/// Optional storage bucket created alongside the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketConfig {
	pub name: String,
	/// Falls back to the cluster location.
	pub location: Option<String>,
	pub storage_class: String,
}

/// Cluster configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
	/// Falls back to `gcp.project`.
	pub project_id: Option<String>,
	/// Falls back to `gcp.region`.
	pub location: Option<String>,
	pub name: String,
	pub release_channel: ReleaseChannel,
	pub resource_labels: BTreeMap<String, String>,
	/// Network name or `projects/...` self-link.
	pub network: Option<String>,
	/// Subnetwork name or `projects/...` self-link.
	pub subnetwork: Option<String>,
	pub enable_private_nodes: bool,
	pub enable_private_endpoint: bool,
	pub master_ipv4_cidr_block: Option<String>,
	pub enable_ip_alias: bool,
	pub cluster_ipv4_cidr_block: Option<String>,
	pub services_ipv4_cidr_block: Option<String>,
	pub master_authorized_networks: Vec<AuthorizedNetwork>,
	pub enable_autopilot: bool,
	pub node_pool: NodePoolConfig,
	pub deletion_protection: bool,
	pub enable_workload_identity: bool,
	pub bucket: Option<BucketConfig>,
}

impl ClusterConfig {
	/// Whether a private cluster block must be sent to the API.
	pub fn private_cluster_enabled(&self) -> bool {
		self.enable_private_nodes
			|| self.enable_private_endpoint
			|| self.master_ipv4_cidr_block.is_some()
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		let pool = &self.node_pool;
		if pool.min_count > pool.max_count {
			return Err(ConfigError::validation(format!(
				"cluster.min_count ({}) exceeds cluster.max_count ({})",
				pool.min_count, pool.max_count
			)));
		}
		if pool.disk_size_gb == 0 {
			return Err(ConfigError::validation(
				"cluster.disk_size_gb must be greater than zero",
			));
		}
		if self.name.is_empty() {
			return Err(ConfigError::missing_field("cluster.name"));
		}
		Ok(())
	}
}

impl Default for ClusterConfig {
	fn default() -> Self {
		ClusterConfigLayer::default().finalize()
	}
}

/// Cluster configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterConfigLayer {
	#[serde(default)]
	pub project_id: Option<String>,
	#[serde(default)]
	pub location: Option<String>,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub release_channel: Option<ReleaseChannel>,
	#[serde(default)]
	pub resource_labels: Option<BTreeMap<String, String>>,
	#[serde(default)]
	pub network: Option<String>,
	#[serde(default)]
	pub subnetwork: Option<String>,
	#[serde(default)]
	pub enable_private_nodes: Option<bool>,
	#[serde(default)]
	pub enable_private_endpoint: Option<bool>,
	#[serde(default)]
	pub master_ipv4_cidr_block: Option<String>,
	#[serde(default)]
	pub enable_ip_alias: Option<bool>,
	#[serde(default)]
	pub cluster_ipv4_cidr_block: Option<String>,
	#[serde(default)]
	pub services_ipv4_cidr_block: Option<String>,
	#[serde(default)]
	pub master_authorized_networks: Option<Vec<AuthorizedNetworkLayer>>,
	#[serde(default)]
	pub enable_autopilot: Option<bool>,
	#[serde(default)]
	pub node_count: Option<u32>,
	#[serde(default)]
	pub min_count: Option<u32>,
	#[serde(default)]
	pub max_count: Option<u32>,
	#[serde(default)]
	pub machine_type: Option<String>,
	#[serde(default)]
	pub disk_size_gb: Option<u32>,
	#[serde(default)]
	pub disk_type: Option<String>,
	#[serde(default)]
	pub oauth_scopes: Option<Vec<String>>,
	#[serde(default)]
	pub node_service_account: Option<String>,
	#[serde(default)]
	pub preemptible_nodes: Option<bool>,
	#[serde(default)]
	pub deletion_protection: Option<bool>,
	#[serde(default)]
	pub enable_workload_identity: Option<bool>,
	#[serde(default)]
	pub gcs_bucket_name: Option<String>,
	#[serde(default)]
	pub gcs_bucket_region: Option<String>,
	#[serde(default)]
	pub gcs_bucket_storage_class: Option<String>,
}

impl ClusterConfigLayer {
	pub fn merge(&mut self, other: ClusterConfigLayer) {
		overwrite!(
			self,
			other,
			project_id,
			location,
			name,
			release_channel,
			resource_labels,
			network,
			subnetwork,
			enable_private_nodes,
			enable_private_endpoint,
			master_ipv4_cidr_block,
			enable_ip_alias,
			cluster_ipv4_cidr_block,
			services_ipv4_cidr_block,
			master_authorized_networks,
			enable_autopilot,
			node_count,
			min_count,
			max_count,
			machine_type,
			disk_size_gb,
			disk_type,
			oauth_scopes,
			node_service_account,
			preemptible_nodes,
			deletion_protection,
			enable_workload_identity,
			gcs_bucket_name,
			gcs_bucket_region,
			gcs_bucket_storage_class,
		);
	}

	pub fn finalize(self) -> ClusterConfig {
		let node_count = self.node_count.unwrap_or(1);
		let node_pool = NodePoolConfig {
			node_count,
			min_count: self.min_count.unwrap_or(node_count),
			max_count: self.max_count.unwrap_or(node_count.max(2)),
			machine_type: self
				.machine_type
				.unwrap_or_else(|| DEFAULT_MACHINE_TYPE.to_string()),
			disk_size_gb: self.disk_size_gb.unwrap_or(DEFAULT_DISK_SIZE_GB),
			disk_type: self
				.disk_type
				.unwrap_or_else(|| DEFAULT_DISK_TYPE.to_string()),
			oauth_scopes: self.oauth_scopes.unwrap_or_else(|| {
				DEFAULT_OAUTH_SCOPES
					.iter()
					.map(|s| s.to_string())
					.collect()
			}),
			service_account: self.node_service_account,
			preemptible: self.preemptible_nodes.unwrap_or(false),
		};

		let resource_labels = self.resource_labels.unwrap_or_else(|| {
			DEFAULT_RESOURCE_LABELS
				.iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect()
		});

		// Entries without a CIDR block cannot be sent to the API.
		let master_authorized_networks = self
			.master_authorized_networks
			.unwrap_or_default()
			.into_iter()
			.filter_map(|entry| {
				entry.cidr_block.map(|cidr_block| AuthorizedNetwork {
					cidr_block,
					display_name: entry.display_name,
				})
			})
			.collect();

		let bucket = self
			.gcs_bucket_name
			.filter(|name| !name.is_empty())
			.map(|name| BucketConfig {
				name,
				location: self.gcs_bucket_region,
				storage_class: self
					.gcs_bucket_storage_class
					.unwrap_or_else(|| DEFAULT_BUCKET_STORAGE_CLASS.to_string()),
			});

		ClusterConfig {
			project_id: self.project_id,
			location: self.location,
			name: self
				.name
				.unwrap_or_else(|| DEFAULT_CLUSTER_NAME.to_string()),
			release_channel: self.release_channel.unwrap_or_default(),
			resource_labels,
			network: self.network.filter(|s| !s.is_empty()),
			subnetwork: self.subnetwork.filter(|s| !s.is_empty()),
			enable_private_nodes: self.enable_private_nodes.unwrap_or(false),
			enable_private_endpoint: self.enable_private_endpoint.unwrap_or(false),
			master_ipv4_cidr_block: self.master_ipv4_cidr_block,
			enable_ip_alias: self.enable_ip_alias.unwrap_or(false),
			cluster_ipv4_cidr_block: self.cluster_ipv4_cidr_block,
			services_ipv4_cidr_block: self.services_ipv4_cidr_block,
			master_authorized_networks,
			enable_autopilot: self.enable_autopilot.unwrap_or(false),
			node_pool,
			deletion_protection: self.deletion_protection.unwrap_or(false),
			enable_workload_identity: self.enable_workload_identity.unwrap_or(true),
			bucket,
		}
	}
}
