// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use gantry_config::GantryConfig;
use gantry_provision::{BucketArgs, ClusterArgs};

use super::write_output;

#[derive(Debug, Clone, Args)]
pub struct ClusterArgsArgs {
	/// Print the optional storage bucket instead of the cluster
	#[arg(long)]
	pub bucket: bool,

	/// Write to a file instead of stdout
	#[arg(long, short)]
	pub output: Option<PathBuf>,
}

pub fn run(args: ClusterArgsArgs, config: &GantryConfig) -> anyhow::Result<()> {
	let text = if args.bucket {
		let bucket = BucketArgs::from_config(config)?
			.context("no bucket configured (set cluster.gcs_bucket_name)")?;
		serde_json::to_string_pretty(&bucket)?
	} else {
		serde_json::to_string_pretty(&ClusterArgs::from_config(config)?)?
	};
	write_output(args.output.as_ref(), &text)
}
