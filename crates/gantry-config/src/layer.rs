// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration produced by a single source.

use serde::Deserialize;

use crate::sections::{
	AgentConfigLayer, ClusterConfigLayer, GcpConfigLayer, LoggingConfigLayer, OtelConfigLayer,
};

/// One source's view of the configuration. Later layers override earlier ones
/// field by field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GantryConfigLayer {
	#[serde(default)]
	pub gcp: Option<GcpConfigLayer>,
	#[serde(default)]
	pub cluster: Option<ClusterConfigLayer>,
	#[serde(default)]
	pub agent: Option<AgentConfigLayer>,
	#[serde(default)]
	pub otel: Option<OtelConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl GantryConfigLayer {
	pub fn merge(&mut self, other: GantryConfigLayer) {
		merge_section(&mut self.gcp, other.gcp, GcpConfigLayer::merge);
		merge_section(&mut self.cluster, other.cluster, ClusterConfigLayer::merge);
		merge_section(&mut self.agent, other.agent, AgentConfigLayer::merge);
		merge_section(&mut self.otel, other.otel, OtelConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(slot: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	if let Some(other) = other {
		match slot {
			Some(existing) => merge(existing, other),
			None => *slot = Some(other),
		}
	}
}
