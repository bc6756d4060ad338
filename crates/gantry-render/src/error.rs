// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Result type alias for text conversions.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised while converting between text and structured documents.
///
/// Substitution, merging and kubeconfig construction are total; these
/// variants only occur when parsing or serializing.
#[derive(Error, Debug)]
pub enum RenderError {
	#[error("YAML error: {0}")]
	Yaml(#[from] serde_yaml::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}
