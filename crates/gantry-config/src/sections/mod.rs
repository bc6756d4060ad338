// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

/// Field-wise layer merge: `Some` in `other` replaces the field in `self`.
macro_rules! overwrite {
	($self:ident, $other:ident, $($field:ident),+ $(,)?) => {
		$(
			if $other.$field.is_some() {
				$self.$field = $other.$field;
			}
		)+
	};
}

pub mod agent;
pub mod cluster;
pub mod gcp;
pub mod logging;
pub mod otel;

pub use agent::{AgentConfig, AgentConfigLayer, ChartConfig};
pub use cluster::{
	AuthorizedNetwork, AuthorizedNetworkLayer, BucketConfig, ClusterConfig, ClusterConfigLayer,
	NodePoolConfig, ReleaseChannel,
};
pub use gcp::{GcpConfig, GcpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use otel::{OtelConfig, OtelConfigLayer};
