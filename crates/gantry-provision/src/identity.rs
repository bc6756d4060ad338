// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource names and IAM member strings.

/// Lets the agent read and write its bucket.
pub const STORAGE_OBJECT_ADMIN_ROLE: &str = "roles/storage.objectAdmin";

/// Lets a Kubernetes service account impersonate a Google service account.
pub const WORKLOAD_IDENTITY_USER_ROLE: &str = "roles/iam.workloadIdentityUser";

/// Service account annotation naming the Google service account to impersonate.
pub const GSA_ANNOTATION: &str = "iam.gke.io/gcp-service-account";

fn is_self_link(value: &str) -> bool {
	value.starts_with("projects/")
}

/// Network self-link. Values already in `projects/...` form pass through.
pub fn network_self_link(project: &str, network: Option<&str>) -> Option<String> {
	match network {
		None | Some("") => None,
		Some(n) if is_self_link(n) => Some(n.to_string()),
		Some(n) => Some(format!("projects/{project}/global/networks/{n}")),
	}
}

/// Subnetwork self-link. Values already in `projects/...` form pass through.
pub fn subnetwork_self_link(project: &str, region: &str, subnetwork: Option<&str>) -> Option<String> {
	match subnetwork {
		None | Some("") => None,
		Some(s) if is_self_link(s) => Some(s.to_string()),
		Some(s) => Some(format!("projects/{project}/regions/{region}/subnetworks/{s}")),
	}
}

/// Workload identity principal for a Kubernetes service account.
pub fn workload_identity_member(project: &str, namespace: &str, ksa: &str) -> String {
	format!("serviceAccount:{project}.svc.id.goog[{namespace}/{ksa}]")
}

pub fn service_account_resource_id(project: &str, email: &str) -> String {
	format!("projects/{project}/serviceAccounts/{email}")
}

/// Email of a service account created in `project`.
pub fn service_account_email(account_id: &str, project: &str) -> String {
	format!("{account_id}@{project}.iam.gserviceaccount.com")
}

pub fn iam_member(email: &str) -> String {
	format!("serviceAccount:{email}")
}

pub fn bucket_url(bucket: &str) -> String {
	format!("gs://{bucket}")
}
