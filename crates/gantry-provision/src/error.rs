// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use gantry_config::ConfigError;
use gantry_render::RenderError;
use thiserror::Error;

/// Result type alias for provisioning operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Errors raised while resolving deployment inputs.
///
/// Collaborator failures are kept apart from [`RenderError`], which only
/// covers turning already-resolved values into documents.
#[derive(Error, Debug)]
pub enum ProvisionError {
	#[error("failed to resolve {attribute}: {message}")]
	Resolution { attribute: String, message: String },

	#[error("secret not found: {secret_id}")]
	SecretNotFound { secret_id: String },

	#[error("invalid TLS payload in secret {secret_id}: {message}")]
	InvalidTlsPayload { secret_id: String, message: String },

	#[error("secret {secret_id} is not valid base64 text: {message}")]
	InvalidSecretEncoding { secret_id: String, message: String },

	#[error("invalid app descriptor {}: {message}", path.display())]
	InvalidAppDescriptor { path: PathBuf, message: String },

	#[error("values template not found: {}", path.display())]
	TemplateNotFound { path: PathBuf },

	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Render(#[from] RenderError),
}

impl ProvisionError {
	pub fn resolution(attribute: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Resolution {
			attribute: attribute.into(),
			message: message.into(),
		}
	}
}
