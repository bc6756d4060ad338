// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Recursive merging of configuration trees.
//!
//! Used for layering Helm chart values: chart defaults, then per-app values,
//! then per-stack overrides. Mappings merge key by key; anything else in the
//! overlay replaces the base value outright. Sequences are never
//! concatenated.
//!
//! Merging is not associative when value types diverge at a key, e.g.
//! `merge(merge({a:{x:1}}, {a:5}), {a:{y:2}})` is `{a:{y:2}}` while
//! `merge({a:{x:1}}, merge({a:5}, {a:{y:2}}))` is `{a:{x:1,y:2}}`.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::RenderResult;

/// A nested configuration document.
pub type Tree = Value;

/// Merge `overlay` on top of `base`, returning a new tree.
///
/// A top-level `null` on either side is treated as an empty mapping.
pub fn merge(base: &Tree, overlay: &Tree) -> Tree {
	match (base, overlay) {
		(Value::Null, Value::Null) => Value::Object(Map::new()),
		(base, Value::Null) => base.clone(),
		(Value::Null, overlay) => overlay.clone(),
		(base, overlay) => merge_value(base, overlay),
	}
}

/// Fold [`merge`] over `layers`, lowest precedence first.
pub fn merge_all<'a, I>(layers: I) -> Tree
where
	I: IntoIterator<Item = &'a Tree>,
{
	layers
		.into_iter()
		.fold(Value::Object(Map::new()), |acc, layer| merge(&acc, layer))
}

fn merge_value(base: &Value, overlay: &Value) -> Value {
	match (base, overlay) {
		(Value::Object(base_map), Value::Object(overlay_map)) => {
			let mut merged = base_map.clone();
			for (key, value) in overlay_map {
				let next = match base_map.get(key) {
					Some(existing) => merge_value(existing, value),
					None => value.clone(),
				};
				merged.insert(key.clone(), next);
			}
			Value::Object(merged)
		}
		(_, overlay) => overlay.clone(),
	}
}

/// Parse a YAML document into a tree. Empty documents yield `{}`.
pub fn parse_yaml(text: &str) -> RenderResult<Tree> {
	if text.trim().is_empty() {
		return Ok(Value::Object(Map::new()));
	}
	let value: Value = serde_yaml::from_str(text)?;
	Ok(match value {
		Value::Null => Value::Object(Map::new()),
		other => other,
	})
}

/// Parse a `---` separated YAML stream. Empty documents are skipped.
pub fn parse_yaml_documents(text: &str) -> RenderResult<Vec<Tree>> {
	let mut documents = Vec::new();
	for document in serde_yaml::Deserializer::from_str(text) {
		let value = Value::deserialize(document)?;
		if !value.is_null() {
			documents.push(value);
		}
	}
	Ok(documents)
}

/// Serialize a tree as YAML.
pub fn to_yaml(tree: &Tree) -> RenderResult<String> {
	Ok(serde_yaml::to_string(tree)?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_override_wins_and_recurses() {
		let base = json!({"a": 1, "b": {"c": 2}});
		let overlay = json!({"b": {"c": 3, "d": 4}});
		assert_eq!(merge(&base, &overlay), json!({"a": 1, "b": {"c": 3, "d": 4}}));
	}

	#[test]
	fn test_scalar_replaces_mapping() {
		assert_eq!(merge(&json!({"a": {"x": 1}}), &json!({"a": 5})), json!({"a": 5}));
	}

	#[test]
	fn test_mapping_replaces_scalar() {
		assert_eq!(
			merge(&json!({"a": 5}), &json!({"a": {"x": 1}})),
			json!({"a": {"x": 1}})
		);
	}

	#[test]
	fn test_sequences_replaced_wholesale() {
		let base = json!({"ports": [1, 2, 3]});
		let overlay = json!({"ports": [9]});
		assert_eq!(merge(&base, &overlay), json!({"ports": [9]}));
	}

	#[test]
	fn test_nested_null_override_wins() {
		assert_eq!(
			merge(&json!({"a": {"x": 1}}), &json!({"a": null})),
			json!({"a": null})
		);
	}

	#[test]
	fn test_empty_and_null_inputs() {
		assert_eq!(merge(&json!({}), &json!({})), json!({}));
		assert_eq!(merge(&Value::Null, &Value::Null), json!({}));
		assert_eq!(merge(&Value::Null, &json!({"a": 1})), json!({"a": 1}));
		assert_eq!(merge(&json!({"a": 1}), &Value::Null), json!({"a": 1}));
	}

	#[test]
	fn test_inputs_untouched() {
		let base = json!({"a": {"b": 1}});
		let overlay = json!({"a": {"c": 2}});
		let _ = merge(&base, &overlay);
		assert_eq!(base, json!({"a": {"b": 1}}));
		assert_eq!(overlay, json!({"a": {"c": 2}}));
	}

	#[test]
	fn test_non_associative_when_types_diverge() {
		let a = json!({"a": {"x": 1}});
		let b = json!({"a": 5});
		let c = json!({"a": {"y": 2}});
		let left = merge(&merge(&a, &b), &c);
		let right = merge(&a, &merge(&b, &c));
		assert_eq!(left, json!({"a": {"y": 2}}));
		assert_eq!(right, json!({"a": {"x": 1, "y": 2}}));
	}

	#[test]
	fn test_merge_all_layers() {
		let defaults = json!({"mode": {"type": "deployment"}, "replicaCount": 1});
		let app = json!({"replicaCount": 2, "mode": {"image": "otel"}});
		let stack = json!({"replicaCount": 3});
		assert_eq!(
			merge_all([&defaults, &app, &stack]),
			json!({"mode": {"type": "deployment", "image": "otel"}, "replicaCount": 3})
		);
		assert_eq!(merge_all(std::iter::empty()), json!({}));
	}

	#[test]
	fn test_parse_yaml_empty_is_mapping() {
		assert_eq!(parse_yaml("").unwrap(), json!({}));
		assert_eq!(parse_yaml("~\n").unwrap(), json!({}));
	}

	#[test]
	fn test_parse_yaml_nested() {
		let tree = parse_yaml("a:\n  b: 1\n  c: [x, y]\n").unwrap();
		assert_eq!(tree, json!({"a": {"b": 1, "c": ["x", "y"]}}));
	}

	#[test]
	fn test_parse_yaml_invalid() {
		assert!(parse_yaml("a: [unclosed").is_err());
	}

	#[test]
	fn test_parse_yaml_documents_skips_empty() {
		let text = "---\nkind: ConfigMap\n---\n---\nkind: Service\nmetadata:\n  name: otel\n";
		let documents = parse_yaml_documents(text).unwrap();
		assert_eq!(documents.len(), 2);
		assert_eq!(documents[0]["kind"], "ConfigMap");
		assert_eq!(documents[1]["metadata"]["name"], "otel");
		assert!(parse_yaml_documents("").unwrap().is_empty());
		assert!(parse_yaml_documents("a: [1\n").is_err());
	}

	#[test]
	fn test_yaml_output_parses_back() {
		let tree = json!({"certificate": {"enableTLS": false}, "replicas": 3});
		let text = to_yaml(&tree).unwrap();
		assert_eq!(parse_yaml(&text).unwrap(), tree);
	}

	fn arb_tree() -> impl Strategy<Value = Value> {
		let leaf = prop_oneof![
			Just(Value::Null),
			any::<bool>().prop_map(Value::Bool),
			any::<i64>().prop_map(|n| json!(n)),
			"[a-z]{0,8}".prop_map(Value::String),
		];
		leaf.prop_recursive(4, 32, 6, |inner| {
			prop_oneof![
				prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
				prop::collection::btree_map("[a-e]{1,3}", inner, 0..5)
					.prop_map(|m| Value::Object(m.into_iter().collect())),
			]
		})
	}

	fn arb_mapping() -> impl Strategy<Value = Value> {
		prop::collection::btree_map("[a-e]{1,3}", arb_tree(), 0..5)
			.prop_map(|m| Value::Object(m.into_iter().collect()))
	}

	proptest! {
		/// Merging a tree with itself yields the same tree.
		#[test]
		fn merge_is_idempotent(tree in arb_mapping()) {
			prop_assert_eq!(merge(&tree, &tree), tree);
		}

		/// Every top-level overlay key ends up in the result with a value
		/// that is either the overlay's or a merge involving it.
		#[test]
		fn overlay_keys_present(base in arb_mapping(), overlay in arb_mapping()) {
			let merged = merge(&base, &overlay);
			let merged_map = merged.as_object().unwrap();
			for (key, value) in overlay.as_object().unwrap() {
				prop_assert!(merged_map.contains_key(key));
				if !value.is_object() {
					prop_assert_eq!(&merged_map[key], value);
				}
			}
			for key in base.as_object().unwrap().keys() {
				prop_assert!(merged_map.contains_key(key));
			}
		}

		/// Merging with an empty overlay returns the base.
		#[test]
		fn empty_overlay_is_identity(tree in arb_mapping()) {
			prop_assert_eq!(merge(&tree, &json!({})), tree);
		}
	}
}
