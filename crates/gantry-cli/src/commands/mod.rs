// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod cluster;
pub mod kubeconfig;
pub mod manifests;
pub mod merge;
pub mod otel;
pub mod template;
pub mod values;

pub use cluster::ClusterArgsArgs;
pub use kubeconfig::KubeconfigArgs;
pub use manifests::ManifestsArgs;
pub use merge::MergeArgs;
pub use otel::OtelArgs;
pub use template::TemplateArgs;
pub use values::ValuesArgs;

use std::path::{Path, PathBuf};

use anyhow::Context as _;

/// Reads a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
	if path == Path::new("-") {
		return std::io::read_to_string(std::io::stdin()).context("failed to read stdin");
	}
	std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Writes to the given file, or stdout.
pub fn write_output(output: Option<&PathBuf>, text: &str) -> anyhow::Result<()> {
	match output {
		Some(path) => {
			std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
			tracing::info!(path = %path.display(), "wrote output");
		}
		None => {
			print!("{text}");
			if !text.ends_with('\n') {
				println!();
			}
		}
	}
	Ok(())
}

/// Parses `KEY=VALUE`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
	let (key, value) = s
		.split_once('=')
		.ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
	if key.is_empty() {
		return Err(format!("empty key in '{s}'"));
	}
	Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_key_val() {
		assert_eq!(
			parse_key_val("REGION=us-east1").unwrap(),
			("REGION".to_string(), "us-east1".to_string())
		);
		assert_eq!(
			parse_key_val("URL=a=b").unwrap(),
			("URL".to_string(), "a=b".to_string())
		);
		assert_eq!(parse_key_val("EMPTY=").unwrap().1, "");
		assert!(parse_key_val("novalue").is_err());
		assert!(parse_key_val("=x").is_err());
	}

	#[test]
	fn test_write_output_to_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("out.yaml");
		write_output(Some(&path), "a: 1\n").unwrap();
		assert_eq!(std::fs::read_to_string(&path).unwrap(), "a: 1\n");
	}
}
