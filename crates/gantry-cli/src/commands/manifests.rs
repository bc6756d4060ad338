// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use clap::Args;
use gantry_config::GantryConfig;
use gantry_provision::{
	agent_iam_bindings, agent_manifests, resolve_gsa_email, resolve_tls_material, EnvSecretStore,
};
use tracing::info;

use super::write_output;

#[derive(Debug, Clone, Args)]
pub struct ManifestsArgs {
	/// Google service account for workload identity (defaults to the derived account)
	#[arg(long)]
	pub gsa_email: Option<String>,

	/// Print the IAM bindings as JSON instead of the manifests
	#[arg(long)]
	pub iam: bool,

	/// Write to a file instead of stdout
	#[arg(long, short)]
	pub output: Option<PathBuf>,
}

pub async fn run(args: ManifestsArgs, config: &GantryConfig) -> anyhow::Result<()> {
	let gsa_email = match args.gsa_email {
		Some(email) => email,
		None => resolve_gsa_email(config)?,
	};

	if args.iam {
		let bindings = agent_iam_bindings(config, &gsa_email)?;
		return write_output(args.output.as_ref(), &serde_json::to_string_pretty(&bindings)?);
	}

	let tls = resolve_tls_material(config, &EnvSecretStore).await?;
	let manifests = agent_manifests(&config.agent, &gsa_email, tls.as_ref());
	info!(
		namespace = %config.agent.namespace,
		gsa = %gsa_email,
		tls_secret = manifests.tls_secret.is_some(),
		"agent manifests built"
	);
	write_output(args.output.as_ref(), &manifests.to_yaml()?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_manifests_with_explicit_email() {
		let dir = tempfile::tempdir().unwrap();
		let output = dir.path().join("manifests.yaml");
		run(
			ManifestsArgs {
				gsa_email: Some("agent@acme.iam.gserviceaccount.com".to_string()),
				iam: false,
				output: Some(output.clone()),
			},
			&GantryConfig::default(),
		)
		.await
		.unwrap();

		let text = std::fs::read_to_string(output).unwrap();
		assert!(text.contains("kind: Namespace"));
		assert!(text.contains("agent@acme.iam.gserviceaccount.com"));
		assert!(!text.contains("kind: Secret"));
	}

	#[tokio::test]
	async fn test_derived_email_needs_project() {
		let err = run(
			ManifestsArgs {
				gsa_email: None,
				iam: false,
				output: None,
			},
			&GantryConfig::default(),
		)
		.await
		.unwrap_err();
		assert!(err.to_string().contains("GANTRY_GCP_PROJECT"));
	}
}
