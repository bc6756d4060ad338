// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Text rendering primitives for Gantry deployments.
//!
//! This crate provides the pure building blocks that turn resolved cloud
//! values into deployable artifacts:
//!
//! - [`template`]: `${NAME}` placeholder substitution with leave-unresolved
//!   semantics
//! - [`merge`]: recursive merging of nested configuration trees (Helm values)
//! - [`kubeconfig`]: kubeconfig documents for static and exec-plugin auth
//!
//! None of these functions perform I/O or fail on well-formed inputs. The only
//! fallible operations are the YAML/JSON conversions at the text boundary.

pub mod error;
pub mod kubeconfig;
pub mod merge;
pub mod template;

pub use error::{RenderError, RenderResult};
pub use kubeconfig::{
	render_bearer_token, render_exec, render_static, InteractiveMode, Kubeconfig, KubeconfigStyle,
};
pub use merge::{merge, merge_all, parse_yaml, parse_yaml_documents, to_yaml, Tree};
pub use template::{render, Substitutions, Template};
