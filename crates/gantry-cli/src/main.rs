// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Gantry command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gantry_config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod version;

use commands::{
	ClusterArgsArgs, KubeconfigArgs, ManifestsArgs, MergeArgs, OtelArgs, TemplateArgs, ValuesArgs,
};

/// Render templates, Helm values and kubeconfigs for WarpStream agents on GKE.
#[derive(Parser, Debug)]
#[command(name = "gantry", about = "WarpStream on GKE deployment toolkit", version)]
struct Cli {
	/// Config file used in place of `$XDG_CONFIG_HOME/gantry/config.toml`
	#[arg(long, global = true, env = "GANTRY_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Fill `${NAME}` placeholders in a text file
	Template(TemplateArgs),
	/// Deep-merge YAML files, later files winning
	Merge(MergeArgs),
	/// Render a kubeconfig for a GKE cluster
	Kubeconfig(KubeconfigArgs),
	/// Render the agent's Helm values from configuration
	Values(ValuesArgs),
	/// Print the namespace, service account and TLS secret manifests
	Manifests(ManifestsArgs),
	/// Print GKE cluster arguments derived from configuration
	ClusterArgs(ClusterArgsArgs),
	/// Plan OpenTelemetry collector deployments from app descriptors
	Otel(OtelArgs),
	/// Show version and build information
	Version,
}

fn init_tracing(logging: &LoggingConfig) {
	// stdout carries rendered documents, so logs go to stderr.
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| logging.level.clone().into());
	let json = logging.json.then(|| {
		tracing_subscriber::fmt::layer()
			.json()
			.with_writer(std::io::stderr)
	});
	let text = (!logging.json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

	tracing_subscriber::registry()
		.with(filter)
		.with(json)
		.with(text)
		.init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	if let Command::Version = cli.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	let config = match &cli.config {
		Some(path) => gantry_config::load_config_with_file(path)?,
		None => gantry_config::load_config()?,
	};
	init_tracing(&config.logging);

	match cli.command {
		Command::Template(args) => commands::template::run(args),
		Command::Merge(args) => commands::merge::run(args),
		Command::Kubeconfig(args) => commands::kubeconfig::run(args),
		Command::Values(args) => commands::values::run(args, &config).await,
		Command::Manifests(args) => commands::manifests::run(args, &config).await,
		Command::ClusterArgs(args) => commands::cluster::run(args, &config),
		Command::Otel(args) => commands::otel::run(args, &config).await,
		Command::Version => Ok(()),
	}
}
