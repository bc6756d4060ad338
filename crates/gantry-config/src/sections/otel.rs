// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenTelemetry collector deployments across clusters.

use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_OTEL_DEFAULTS_FILE: &str = "defaults.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtelConfig {
	/// App descriptor files, one collector deployment each.
	pub apps: Vec<PathBuf>,
	/// Helm values shared by every app, merged underneath the app's own values.
	pub defaults_path: PathBuf,
}

impl Default for OtelConfig {
	fn default() -> Self {
		OtelConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OtelConfigLayer {
	#[serde(default)]
	pub apps: Option<Vec<PathBuf>>,
	#[serde(default)]
	pub defaults_path: Option<PathBuf>,
}

impl OtelConfigLayer {
	pub fn merge(&mut self, other: OtelConfigLayer) {
		overwrite!(self, other, apps, defaults_path);
	}

	pub fn finalize(self) -> OtelConfig {
		OtelConfig {
			apps: self.apps.unwrap_or_default(),
			defaults_path: self
				.defaults_path
				.unwrap_or_else(|| PathBuf::from(DEFAULT_OTEL_DEFAULTS_FILE)),
		}
	}
}
