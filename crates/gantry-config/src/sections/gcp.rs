// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Google Cloud project configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// Project and default region (runtime, fully resolved).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcpConfig {
	pub project: Option<String>,
	pub region: Option<String>,
}

impl GcpConfig {
	pub fn require_project(&self) -> Result<&str, ConfigError> {
		self
			.project
			.as_deref()
			.ok_or_else(|| ConfigError::missing_field("gcp.project (GANTRY_GCP_PROJECT)"))
	}

	pub fn require_region(&self) -> Result<&str, ConfigError> {
		self
			.region
			.as_deref()
			.ok_or_else(|| ConfigError::missing_field("gcp.region (GANTRY_GCP_REGION)"))
	}
}

/// GCP configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GcpConfigLayer {
	#[serde(default)]
	pub project: Option<String>,
	#[serde(default)]
	pub region: Option<String>,
}

impl GcpConfigLayer {
	pub fn merge(&mut self, other: GcpConfigLayer) {
		if other.project.is_some() {
			self.project = other.project;
		}
		if other.region.is_some() {
			self.region = other.region;
		}
	}

	pub fn finalize(self) -> GcpConfig {
		GcpConfig {
			project: self.project,
			region: self.region,
		}
	}
}
