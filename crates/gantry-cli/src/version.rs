// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build information.

use gantry_config::sections::agent::{DEFAULT_CHART_NAME, DEFAULT_CHART_VERSION};

/// Format version info for display.
pub fn format_version_info() -> String {
	format!(
		"gantry {}\n\
         Platform:      {}-{}\n\
         Default chart: {} {}",
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH,
		DEFAULT_CHART_NAME,
		DEFAULT_CHART_VERSION,
	)
}
