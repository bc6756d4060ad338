// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use gantry_config::GantryConfig;
use gantry_provision::{load_values_template, resolve_agent_values, EnvSecretStore};
use gantry_render::{merge_all, parse_yaml, to_yaml};
use tracing::info;

use super::{read_input, write_output};

#[derive(Debug, Clone, Args)]
pub struct ValuesArgs {
	/// Values template (defaults to `agent.values_template_path`)
	#[arg(long)]
	pub template: Option<PathBuf>,

	/// YAML overlays merged on top of the rendered values, in order
	#[arg(long = "overlay", value_name = "FILE")]
	pub overlays: Vec<PathBuf>,

	/// Emit JSON instead of YAML
	#[arg(long)]
	pub json: bool,

	/// Write to a file instead of stdout
	#[arg(long, short)]
	pub output: Option<PathBuf>,
}

pub async fn run(args: ValuesArgs, config: &GantryConfig) -> anyhow::Result<()> {
	let path = args
		.template
		.clone()
		.unwrap_or_else(|| config.agent.values_template_path.clone());
	let template = load_values_template(&path).await?;

	let values = resolve_agent_values(config, &EnvSecretStore, &template).await?;

	let mut documents = vec![values];
	for overlay in &args.overlays {
		let text = read_input(overlay)?;
		documents.push(
			parse_yaml(&text).with_context(|| format!("failed to parse {}", overlay.display()))?,
		);
	}
	let merged = merge_all(&documents);
	info!(
		template = %path.display(),
		overlays = args.overlays.len(),
		"agent values ready"
	);

	let text = if args.json {
		serde_json::to_string_pretty(&merged)?
	} else {
		to_yaml(&merged)?
	};
	write_output(args.output.as_ref(), &text)
}
