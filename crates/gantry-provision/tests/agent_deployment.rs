// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end agent deployment inputs from a config file and a secret store.

use std::io::Write;

use gantry_config::load_config_with_file;
use gantry_provision::{
	agent_manifests, load_values_template, resolve_agent_values, resolve_gsa_email,
	resolve_kubeconfig, resolve_tls_material, InMemorySecretStore, StaticClusterOutputs,
};
use gantry_render::{merge, parse_yaml, Kubeconfig, KubeconfigStyle};

const CONFIG: &str = r#"
[gcp]
project = "acme-lab"
region = "us-east1"

[agent]
namespace = "streams"
stack_prefix = "lab"
agent_key_secret_id = "agent-key"
gcp_tls_cert_secret_id = "agent-tls"
dns_record_name = "kafka.lab.example.com"
"#;

const VALUES: &str = r#"
config:
  bucketURL: "${BUCKET_URL}"
  agentKey: "${AGENT_KEY}"
  virtualClusterID: "${VIRTUAL_CLUSTER_ID}"
  region: "${WARPSTREAM_REGION}"
serviceAccount:
  name: "${SERVICE_ACCOUNT_NAME}"
kafkaService:
  host: "${DNS_RECORD_NAME}"
certificate:
  secretName: "${CERTIFICATE_SECRET_NAME}"
resources:
  requests:
    cpu: "2"
"#;

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
	let path = dir.path().join(name);
	let mut file = std::fs::File::create(&path).unwrap();
	file.write_all(contents.as_bytes()).unwrap();
	path
}

#[tokio::test]
async fn agent_inputs_follow_configuration() {
	let dir = tempfile::tempdir().unwrap();
	let config_path = write_file(&dir, "gantry.toml", CONFIG);
	let values_path = write_file(&dir, "values.yaml", VALUES);

	let config = load_config_with_file(&config_path).unwrap();
	let store = InMemorySecretStore::new()
		.with_secret("agent-key", "aks_lab")
		.with_secret("agent-tls", r#"{"tls.crt": "C", "tls.key": "K", "ca.crt": "CA"}"#);

	let template = load_values_template(&values_path).await.unwrap();
	let values = resolve_agent_values(&config, &store, &template).await.unwrap();

	if std::env::var("GANTRY_AGENT_NAMESPACE").is_err() {
		assert_eq!(values["config"]["bucketURL"], "gs://lab-streams-bucket");
		assert_eq!(values["serviceAccount"]["name"], "lab-streams-sa");
		assert_eq!(values["certificate"]["secretName"], "lab-warpstream-tls");
	}
	assert_eq!(values["config"]["agentKey"], "aks_lab");
	assert_eq!(values["config"]["virtualClusterID"], "");
	assert_eq!(values["certificate"]["enableTLS"], true);

	// Operator overrides merge on top of the rendered values.
	let overrides = parse_yaml("resources:\n  requests:\n    memory: 8Gi\n").unwrap();
	let merged = merge(&values, &overrides);
	assert_eq!(merged["resources"]["requests"]["cpu"], "2");
	assert_eq!(merged["resources"]["requests"]["memory"], "8Gi");

	let gsa_email = resolve_gsa_email(&config).unwrap();
	let tls = resolve_tls_material(&config, &store).await.unwrap();
	let manifests = agent_manifests(&config.agent, &gsa_email, tls.as_ref());
	let yaml = manifests.to_yaml().unwrap();
	assert!(yaml.contains(&gsa_email));
	assert!(manifests.tls_secret.is_some());
}

#[tokio::test]
async fn kubeconfig_from_cluster_outputs_parses() {
	let outputs = StaticClusterOutputs::new("lab", "34.10.0.1", "Q0EtREFUQQ==")
		.with_dns_endpoint("gke-1234.us-east1.gke.goog");

	let exec = resolve_kubeconfig(&outputs, KubeconfigStyle::Exec)
		.await
		.unwrap();
	let parsed = Kubeconfig::from_yaml(exec.expose()).unwrap();
	assert_eq!(parsed.current_context, "lab");
	assert_eq!(parsed.clusters[0].cluster.server, "https://gke-1234.us-east1.gke.goog");

	let stat = resolve_kubeconfig(&outputs, KubeconfigStyle::Static)
		.await
		.unwrap();
	let parsed = Kubeconfig::from_yaml(stat.expose()).unwrap();
	assert_eq!(parsed.current_context, "gke_lab");
}
