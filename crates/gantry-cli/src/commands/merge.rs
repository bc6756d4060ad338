// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Args;
use gantry_render::{merge_all, parse_yaml, to_yaml, Tree};
use tracing::debug;

use super::{read_input, write_output};

#[derive(Debug, Clone, Args)]
pub struct MergeArgs {
	/// Base document
	pub base: PathBuf,

	/// Overlays applied in order
	pub overlays: Vec<PathBuf>,

	/// Emit JSON instead of YAML
	#[arg(long)]
	pub json: bool,

	/// Write to a file instead of stdout
	#[arg(long, short)]
	pub output: Option<PathBuf>,
}

fn load(path: &Path) -> anyhow::Result<Tree> {
	let text = read_input(path)?;
	parse_yaml(&text).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn merge_files(args: &MergeArgs) -> anyhow::Result<Tree> {
	let trees = std::iter::once(&args.base)
		.chain(args.overlays.iter())
		.map(PathBuf::as_path)
		.map(load)
		.collect::<anyhow::Result<Vec<_>>>()?;
	debug!(documents = trees.len(), "merging documents");
	Ok(merge_all(&trees))
}

pub fn run(args: MergeArgs) -> anyhow::Result<()> {
	let merged = merge_files(&args)?;
	let text = if args.json {
		serde_json::to_string_pretty(&merged)?
	} else {
		to_yaml(&merged)?
	};
	write_output(args.output.as_ref(), &text)
}
