// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use gantry_config::GantryConfig;
use gantry_provision::{
	load_otel_apps, load_otel_defaults, plan_otel_deployment, resolve_app_kubeconfig,
	EnvSecretStore, OtelApp,
};
use gantry_render::to_yaml;

use super::write_output;

#[derive(Debug, Clone, Args)]
pub struct OtelArgs {
	/// Only this app (by descriptor name)
	#[arg(long)]
	pub app: Option<String>,

	/// Print the app's cluster kubeconfig instead of the deployment plan
	#[arg(long, requires = "app")]
	pub kubeconfig: bool,

	/// Shared chart values (defaults to `otel.defaults_path`)
	#[arg(long)]
	pub defaults: Option<PathBuf>,

	/// Emit JSON instead of YAML
	#[arg(long)]
	pub json: bool,

	/// Write to a file instead of stdout
	#[arg(long, short)]
	pub output: Option<PathBuf>,
}

fn select(apps: Vec<OtelApp>, name: Option<&str>) -> anyhow::Result<Vec<OtelApp>> {
	let Some(name) = name else {
		return Ok(apps);
	};
	let app = apps
		.into_iter()
		.find(|app| app.name == name)
		.with_context(|| format!("no otel app named '{name}'"))?;
	Ok(vec![app])
}

pub async fn run(args: OtelArgs, config: &GantryConfig) -> anyhow::Result<()> {
	let apps = select(load_otel_apps(config).await?, args.app.as_deref())?;

	if args.kubeconfig {
		let app = apps.first().context("--kubeconfig needs --app")?;
		let kubeconfig = resolve_app_kubeconfig(app, config, &EnvSecretStore).await?;
		return write_output(args.output.as_ref(), kubeconfig.expose());
	}

	let defaults_path = args
		.defaults
		.clone()
		.unwrap_or_else(|| config.otel.defaults_path.clone());
	let defaults = load_otel_defaults(&defaults_path).await?;

	let mut deployments = BTreeMap::new();
	for app in &apps {
		deployments.insert(app.name.clone(), plan_otel_deployment(app, &defaults).await?);
	}

	let text = if args.json {
		serde_json::to_string_pretty(&deployments)?
	} else {
		to_yaml(&serde_json::to_value(&deployments)?)?
	};
	write_output(args.output.as_ref(), &text)
}
