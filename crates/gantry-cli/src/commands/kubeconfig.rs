// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgGroup, Args, ValueEnum};
use gantry_render::{Kubeconfig, KubeconfigStyle};

use super::write_output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthStyle {
	/// Embedded CA data, context `gke_{name}`
	Static,
	/// gke-gcloud-auth-plugin, context `{name}`
	Exec,
}

impl From<AuthStyle> for KubeconfigStyle {
	fn from(style: AuthStyle) -> Self {
		match style {
			AuthStyle::Static => KubeconfigStyle::Static,
			AuthStyle::Exec => KubeconfigStyle::Exec,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	Yaml,
	Json,
}

#[derive(Debug, Clone, Args)]
#[command(group(ArgGroup::new("ca_source").required(true).args(["ca", "ca_file"])))]
pub struct KubeconfigArgs {
	/// Cluster name
	#[arg(long)]
	pub name: String,

	/// Control plane endpoint (host or IP, without scheme)
	#[arg(long)]
	pub endpoint: String,

	/// Base64-encoded cluster CA certificate
	#[arg(long)]
	pub ca: Option<String>,

	/// File holding the base64-encoded cluster CA certificate
	#[arg(long)]
	pub ca_file: Option<PathBuf>,

	#[arg(long, value_enum, default_value_t = AuthStyle::Exec)]
	pub auth: AuthStyle,

	#[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
	pub format: OutputFormat,

	/// Write to a file instead of stdout
	#[arg(long, short)]
	pub output: Option<PathBuf>,
}

fn ca_data(args: &KubeconfigArgs) -> anyhow::Result<String> {
	match (&args.ca, &args.ca_file) {
		(Some(ca), _) => Ok(ca.trim().to_string()),
		(None, Some(path)) => Ok(std::fs::read_to_string(path)
			.with_context(|| format!("failed to read {}", path.display()))?
			.trim()
			.to_string()),
		(None, None) => anyhow::bail!("one of --ca or --ca-file is required"),
	}
}

pub fn render(args: &KubeconfigArgs) -> anyhow::Result<String> {
	let ca = ca_data(args)?;
	let yaml = KubeconfigStyle::from(args.auth).render(&args.name, &args.endpoint, &ca);
	match args.format {
		OutputFormat::Yaml => Ok(yaml),
		OutputFormat::Json => Ok(Kubeconfig::from_yaml(&yaml)?.to_json()?),
	}
}

pub fn run(args: KubeconfigArgs) -> anyhow::Result<()> {
	let text = render(&args)?;
	write_output(args.output.as_ref(), &text)
}
