// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Args;
use gantry_render::Template;
use tracing::warn;

use super::{parse_key_val, read_input, write_output};

#[derive(Debug, Clone, Args)]
pub struct TemplateArgs {
	/// Template file, or `-` for stdin
	pub file: PathBuf,

	/// Substitution value, repeatable
	#[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
	pub set: Vec<(String, String)>,

	/// Also substitute from process environment variables (`--set` wins)
	#[arg(long)]
	pub from_env: bool,

	/// Fail when placeholders remain unresolved
	#[arg(long)]
	pub strict: bool,

	/// Write to a file instead of stdout
	#[arg(long, short)]
	pub output: Option<PathBuf>,
}

fn mapping(args: &TemplateArgs) -> HashMap<String, String> {
	let mut mapping: HashMap<String, String> = if args.from_env {
		std::env::vars_os()
			.filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
			.collect()
	} else {
		HashMap::new()
	};
	mapping.extend(args.set.iter().cloned());
	mapping
}

pub fn run(args: TemplateArgs) -> anyhow::Result<()> {
	let template = Template::new(read_input(&args.file)?);
	let mapping = mapping(&args);

	let unresolved = template.unresolved(&mapping);
	if !unresolved.is_empty() {
		if args.strict {
			anyhow::bail!("unresolved placeholders: {}", unresolved.join(", "));
		}
		warn!(placeholders = %unresolved.join(", "), "leaving placeholders unresolved");
	}

	write_output(args.output.as_ref(), &template.render(&mapping))
}
