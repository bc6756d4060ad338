// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Kubeconfig generation from deferred cluster outputs.

use gantry_config::SecretString;
use gantry_render::KubeconfigStyle;
use tracing::{debug, instrument};

use crate::collaborators::ClusterOutputs;
use crate::error::ProvisionResult;

/// Waits for every cluster attribute, then renders the kubeconfig once.
///
/// The DNS control plane endpoint is preferred over the IP endpoint when the
/// cluster exposes one. The result is wrapped as a secret since static
/// kubeconfigs embed credentials.
#[instrument(skip(outputs))]
pub async fn resolve_kubeconfig<O>(outputs: &O, style: KubeconfigStyle) -> ProvisionResult<SecretString>
where
	O: ClusterOutputs + ?Sized,
{
	let (name, endpoint, dns_endpoint, ca) = futures::try_join!(
		outputs.name(),
		outputs.endpoint(),
		outputs.dns_endpoint(),
		outputs.ca_certificate(),
	)?;

	let server = dns_endpoint.unwrap_or(endpoint);
	debug!(cluster = %name, server = %server, "cluster outputs resolved");

	Ok(SecretString::new(style.render(&name, &server, &ca)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::collaborators::StaticClusterOutputs;
	use crate::error::ProvisionError;
	use async_trait::async_trait;
	use gantry_render::{render_exec, render_static};

	struct Unreachable;

	#[async_trait]
	impl ClusterOutputs for Unreachable {
		async fn name(&self) -> ProvisionResult<String> {
			Ok("c".to_string())
		}

		async fn endpoint(&self) -> ProvisionResult<String> {
			Err(ProvisionError::resolution("endpoint", "backend unavailable"))
		}

		async fn ca_certificate(&self) -> ProvisionResult<String> {
			Ok(String::new())
		}
	}

	#[tokio::test]
	async fn test_static_matches_direct_render() {
		let outputs = StaticClusterOutputs::new("prod", "34.1.2.3", "Q0FEQVRB");
		let kubeconfig = resolve_kubeconfig(&outputs, KubeconfigStyle::Static)
			.await
			.unwrap();
		assert_eq!(
			kubeconfig.expose(),
			&render_static("prod", "34.1.2.3", "Q0FEQVRB")
		);
	}

	#[tokio::test]
	async fn test_dns_endpoint_preferred() {
		let outputs = StaticClusterOutputs::new("prod", "34.1.2.3", "Q0E=")
			.with_dns_endpoint("gke-abc.us-east1.gke.goog");
		let kubeconfig = resolve_kubeconfig(&outputs, KubeconfigStyle::Exec)
			.await
			.unwrap();
		assert_eq!(
			kubeconfig.expose(),
			&render_exec("prod", "gke-abc.us-east1.gke.goog", "Q0E=")
		);
		assert!(!kubeconfig.expose().contains("34.1.2.3"));
	}

	#[tokio::test]
	async fn test_resolution_failure_propagates() {
		let err = resolve_kubeconfig(&Unreachable, KubeconfigStyle::Exec)
			.await
			.unwrap_err();
		assert!(matches!(err, ProvisionError::Resolution { .. }));
	}

	#[tokio::test]
	async fn test_accepts_trait_object() {
		let outputs: Box<dyn ClusterOutputs> = Box::new(StaticClusterOutputs::new("c", "e", "ca"));
		let kubeconfig = resolve_kubeconfig(outputs.as_ref(), KubeconfigStyle::Static)
			.await
			.unwrap();
		assert!(kubeconfig.expose().contains("gke_c"));
	}
}
