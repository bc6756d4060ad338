// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! GKE cluster, node pool and bucket arguments derived from configuration.

use std::collections::BTreeMap;

use gantry_config::GantryConfig;
use serde::Serialize;

use crate::error::ProvisionResult;
use crate::identity::{network_self_link, subnetwork_self_link};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterArgs {
	pub project: String,
	pub location: String,
	pub name: String,
	pub release_channel: String,
	pub resource_labels: BTreeMap<String, String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub network: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subnetwork: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub private_cluster_config: Option<PrivateClusterArgs>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub master_authorized_networks_config: Option<Vec<CidrBlockArgs>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ip_allocation_policy: Option<IpAllocationArgs>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub workload_pool: Option<String>,
	pub enable_autopilot: bool,
	/// Standard clusters drop the default pool in favour of [`NodePoolArgs`].
	pub remove_default_node_pool: bool,
	pub initial_node_count: u32,
	pub deletion_protection: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub node_pool: Option<NodePoolArgs>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateClusterArgs {
	pub enable_private_nodes: bool,
	pub enable_private_endpoint: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub master_ipv4_cidr_block: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CidrBlockArgs {
	pub cidr_block: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAllocationArgs {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cluster_ipv4_cidr_block: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub services_ipv4_cidr_block: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolArgs {
	pub min_node_count: u32,
	pub max_node_count: u32,
	pub machine_type: String,
	pub disk_size_gb: u32,
	pub disk_type: String,
	pub oauth_scopes: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub service_account: Option<String>,
	pub preemptible: bool,
}

/// Labels copied from the cluster onto its bucket.
pub const BUCKET_LABEL_KEYS: &[&str] = &["product", "environment"];

/// Storage bucket created next to the cluster when `gcs_bucket_name` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketArgs {
	pub name: String,
	pub project: String,
	pub location: String,
	pub storage_class: String,
	pub uniform_bucket_level_access: bool,
	pub labels: BTreeMap<String, String>,
}

impl BucketArgs {
	/// `None` when no bucket is configured. The bucket lives in the `gcp`
	/// project and defaults to the `gcp` region.
	pub fn from_config(config: &GantryConfig) -> ProvisionResult<Option<Self>> {
		let Some(bucket) = config.cluster.bucket.as_ref() else {
			return Ok(None);
		};
		let location = match bucket.location.as_deref() {
			Some(location) => location.to_string(),
			None => config.gcp.require_region()?.to_string(),
		};
		let labels = BUCKET_LABEL_KEYS
			.iter()
			.filter_map(|key| {
				config
					.cluster
					.resource_labels
					.get(*key)
					.map(|value| (key.to_string(), value.clone()))
			})
			.collect();

		Ok(Some(Self {
			name: bucket.name.clone(),
			project: config.gcp.require_project()?.to_string(),
			location,
			storage_class: bucket.storage_class.clone(),
			uniform_bucket_level_access: true,
			labels,
		}))
	}
}

impl ClusterArgs {
	/// Requires a project and a location, either on the cluster or under `gcp`.
	pub fn from_config(config: &GantryConfig) -> ProvisionResult<Self> {
		let project = config.cluster_project()?.to_string();
		let location = config.cluster_location()?.to_string();
		let cluster = &config.cluster;

		let private_cluster_config = cluster.private_cluster_enabled().then(|| PrivateClusterArgs {
			enable_private_nodes: cluster.enable_private_nodes,
			enable_private_endpoint: cluster.enable_private_endpoint,
			master_ipv4_cidr_block: cluster.master_ipv4_cidr_block.clone(),
		});

		let master_authorized_networks_config = (!cluster.master_authorized_networks.is_empty())
			.then(|| {
				cluster
					.master_authorized_networks
					.iter()
					.map(|n| CidrBlockArgs {
						cidr_block: n.cidr_block.clone(),
						display_name: n.display_name.clone(),
					})
					.collect()
			});

		let ip_allocation_policy = cluster.enable_ip_alias.then(|| IpAllocationArgs {
			cluster_ipv4_cidr_block: cluster.cluster_ipv4_cidr_block.clone(),
			services_ipv4_cidr_block: cluster.services_ipv4_cidr_block.clone(),
		});

		let workload_pool = cluster
			.enable_workload_identity
			.then(|| format!("{project}.svc.id.goog"));

		let pool = &cluster.node_pool;
		let node_pool = (!cluster.enable_autopilot).then(|| NodePoolArgs {
			min_node_count: pool.min_count,
			max_node_count: pool.max_count,
			machine_type: pool.machine_type.clone(),
			disk_size_gb: pool.disk_size_gb,
			disk_type: pool.disk_type.clone(),
			oauth_scopes: pool.oauth_scopes.clone(),
			service_account: pool.service_account.clone(),
			preemptible: pool.preemptible,
		});

		Ok(Self {
			network: network_self_link(&project, cluster.network.as_deref()),
			subnetwork: subnetwork_self_link(&project, &location, cluster.subnetwork.as_deref()),
			project,
			location,
			name: cluster.name.clone(),
			release_channel: cluster.release_channel.to_string(),
			resource_labels: cluster.resource_labels.clone(),
			private_cluster_config,
			master_authorized_networks_config,
			ip_allocation_policy,
			workload_pool,
			enable_autopilot: cluster.enable_autopilot,
			remove_default_node_pool: !cluster.enable_autopilot,
			// The API requires one even when the default pool is removed.
			initial_node_count: 1,
			deletion_protection: cluster.deletion_protection,
			node_pool,
		})
	}
}
