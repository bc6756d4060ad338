// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret values and environment loading.
//!
//! [`Secret<T>`] keeps agent keys, kubeconfigs and TLS material out of logs:
//! `Debug` and `Display` print [`REDACTED`], and the value is zeroized on drop.
//! [`load_secret_env`] reads `NAME` directly or from the file named by
//! `NAME_FILE`, the usual convention for mounted secrets.

use std::fmt;
use std::path::PathBuf;

use zeroize::Zeroize;

/// Placeholder printed instead of secret values.
pub const REDACTED: &str = "[REDACTED]";

/// A value that must not be logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret<T: Zeroize>(T);

/// The common case: a secret string.
pub type SecretString = Secret<String>;

impl<T: Zeroize> Secret<T> {
	pub fn new(value: T) -> Self {
		Self(value)
	}

	/// Access the inner value. Keep the borrow short.
	pub fn expose(&self) -> &T {
		&self.0
	}
}

impl<T: Zeroize> Drop for Secret<T> {
	fn drop(&mut self) {
		self.0.zeroize();
	}
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T: Zeroize> fmt::Display for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

/// Errors from [`load_secret_env`].
#[derive(Debug, thiserror::Error)]
pub enum SecretEnvError {
	#[error("both {name} and {name}_FILE are set")]
	Conflict { name: String },

	#[error("failed to read {name}_FILE at {path}: {source}")]
	FileRead {
		name: String,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Load a secret from `name`, or from the file at `{name}_FILE`.
///
/// Empty values count as unset. A trailing newline in the file is stripped.
pub fn load_secret_env(name: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{name}_FILE");
	let direct = std::env::var(name).ok().filter(|v| !v.is_empty());
	let file = std::env::var_os(&file_var)
		.map(PathBuf::from)
		.filter(|p| !p.as_os_str().is_empty());

	match (direct, file) {
		(Some(_), Some(_)) => Err(SecretEnvError::Conflict {
			name: name.to_string(),
		}),
		(Some(value), None) => Ok(Some(SecretString::new(value))),
		(None, Some(path)) => {
			let mut content =
				std::fs::read_to_string(&path).map_err(|source| SecretEnvError::FileRead {
					name: name.to_string(),
					path: path.clone(),
					source,
				})?;
			let trimmed_len = content.trim_end_matches(['\n', '\r']).len();
			content.truncate(trimmed_len);
			tracing::debug!(name, path = %path.display(), "loaded secret from file");
			Ok(Some(SecretString::new(content)))
		}
		(None, None) => Ok(None),
	}
}
