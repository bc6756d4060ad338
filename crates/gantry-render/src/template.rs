// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! `${NAME}` placeholder substitution.
//!
//! Templates are opaque text. Substitution points are found with a regex and
//! resolved against a [`Substitutions`] mapping in a single left-to-right
//! pass. Placeholders the mapping does not know are left in the output
//! verbatim, delimiters included, so a partially resolved template can be fed
//! through another pass later.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// A lookup from placeholder identifier to replacement value.
pub trait Substitutions {
	fn lookup(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> Substitutions for HashMap<String, String, S> {
	fn lookup(&self, name: &str) -> Option<&str> {
		self.get(name).map(String::as_str)
	}
}

impl<S: BuildHasher> Substitutions for HashMap<&str, &str, S> {
	fn lookup(&self, name: &str) -> Option<&str> {
		self.get(name).copied()
	}
}

impl Substitutions for BTreeMap<String, String> {
	fn lookup(&self, name: &str) -> Option<&str> {
		self.get(name).map(String::as_str)
	}
}

impl Substitutions for BTreeMap<&str, &str> {
	fn lookup(&self, name: &str) -> Option<&str> {
		self.get(name).copied()
	}
}

impl<T: Substitutions + ?Sized> Substitutions for &T {
	fn lookup(&self, name: &str) -> Option<&str> {
		(**self).lookup(name)
	}
}

/// Substitute every `${NAME}` in `template` with its value from `mapping`.
///
/// Replacement values are inserted as-is and never re-scanned. Unknown
/// placeholders and malformed syntax (an unbalanced `${`, an identifier that
/// starts with a digit) pass through unchanged.
pub fn render<M: Substitutions + ?Sized>(template: &str, mapping: &M) -> String {
	PLACEHOLDER_REGEX
		.replace_all(template, |caps: &Captures<'_>| match mapping.lookup(&caps[1]) {
			Some(value) => value.to_string(),
			None => caps[0].to_string(),
		})
		.into_owned()
}

/// A template with helpers for inspecting its placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
	text: String,
}

impl Template {
	pub fn new(text: impl Into<String>) -> Self {
		Self { text: text.into() }
	}

	pub fn as_str(&self) -> &str {
		&self.text
	}

	/// Distinct placeholder names, in order of first occurrence.
	pub fn placeholders(&self) -> Vec<&str> {
		let mut names: Vec<&str> = Vec::new();
		for caps in PLACEHOLDER_REGEX.captures_iter(&self.text) {
			if let Some(name) = caps.get(1).map(|m| m.as_str()) {
				if !names.contains(&name) {
					names.push(name);
				}
			}
		}
		names
	}

	/// Placeholder names that `mapping` cannot resolve.
	pub fn unresolved<M: Substitutions + ?Sized>(&self, mapping: &M) -> Vec<&str> {
		self
			.placeholders()
			.into_iter()
			.filter(|name| mapping.lookup(name).is_none())
			.collect()
	}

	pub fn render<M: Substitutions + ?Sized>(&self, mapping: &M) -> String {
		render(&self.text, mapping)
	}
}

impl From<String> for Template {
	fn from(text: String) -> Self {
		Self::new(text)
	}
}

impl From<&str> for Template {
	fn from(text: &str) -> Self {
		Self::new(text)
	}
}
