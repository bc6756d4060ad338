// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deployment wiring for WarpStream agents on GKE.
//!
//! This crate sits between configuration and the rendering primitives:
//! - [`collaborators`]: traits for cluster outputs and secrets that only
//!   become available once cloud resources exist
//! - [`kubeconfig`]: joins deferred cluster outputs into a kubeconfig
//! - [`values`]: the agent Helm values pipeline
//! - [`manifests`]: namespace, service account, TLS secret and IAM bindings
//! - [`cluster`]: GKE cluster, node pool and bucket arguments
//! - [`otel`]: OpenTelemetry collector deployments across clusters
//!
//! Nothing here talks to GCP or Kubernetes directly.

pub mod cluster;
pub mod collaborators;
pub mod error;
pub mod identity;
pub mod kubeconfig;
pub mod manifests;
pub mod otel;
pub mod values;

pub use cluster::{BucketArgs, ClusterArgs};
pub use collaborators::{
	ClusterOutputs, EnvSecretStore, InMemorySecretStore, SecretStore, StaticClusterOutputs,
	LATEST_VERSION,
};
pub use error::{ProvisionError, ProvisionResult};
pub use kubeconfig::resolve_kubeconfig;
pub use manifests::{
	agent_iam_bindings, agent_manifests, bucket_labels, resolve_gsa_email, resolve_tls_material,
	AgentManifests, IamBinding, TlsMaterial,
};
pub use otel::{
	inject_namespace, load_extra_manifests, load_otel_apps, load_otel_defaults,
	plan_otel_deployment, resolve_app_kubeconfig, HelmChartRef, HelmRelease, KubeconfigSecretRef,
	OtelApp, OtelDeployment,
};
pub use values::{
	ensure_tls, load_values_template, render_agent_values, resolve_agent_values,
	AgentPlaceholders,
};
