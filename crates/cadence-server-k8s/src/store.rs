// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use cadence_manifest_core::{CronJob, JobSpec};

use crate::error::{ClusterError, ClusterResult};

/// A job as it currently exists in the cluster job store.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterJobRecord {
	pub name: String,
	pub suspend: bool,
	pub spec: JobSpec,
	/// Store-assigned version used for optimistic concurrency.
	pub resource_version: Option<String>,
}

impl ClusterJobRecord {
	/// A record that does not exist in the store yet.
	pub fn new(spec: JobSpec) -> Self {
		Self {
			name: spec.name.clone(),
			suspend: spec.suspend,
			spec,
			resource_version: None,
		}
	}

	/// Replace the carried spec, keeping identity and version.
	pub fn with_spec(&self, spec: JobSpec) -> Self {
		Self {
			name: self.name.clone(),
			suspend: spec.suspend,
			spec: JobSpec {
				name: self.name.clone(),
				..spec
			},
			resource_version: self.resource_version.clone(),
		}
	}

	pub fn with_suspend(&self, suspend: bool) -> Self {
		Self {
			suspend,
			spec: self.spec.with_suspend(suspend),
			..self.clone()
		}
	}

	pub fn to_cron_job(&self) -> CronJob {
		let mut cron_job = self.spec.with_suspend(self.suspend).to_cron_job();
		cron_job.metadata.resource_version = self.resource_version.clone();
		cron_job
	}
}

impl TryFrom<CronJob> for ClusterJobRecord {
	type Error = ClusterError;

	fn try_from(cron_job: CronJob) -> Result<Self, Self::Error> {
		let resource_version = cron_job.metadata.resource_version.clone();
		let spec = JobSpec::try_from(cron_job).map_err(|e| ClusterError::InvalidRecord {
			message: e.to_string(),
		})?;

		Ok(Self {
			name: spec.name.clone(),
			suspend: spec.suspend,
			spec,
			resource_version,
		})
	}
}

/// Fail unless `spec` can live in `namespace`. A spec without a namespace
/// is placed in the store's.
pub fn ensure_namespace(spec: &JobSpec, namespace: &str) -> ClusterResult<()> {
	match spec.namespace.as_deref() {
		Some(requested) if requested != namespace => Err(ClusterError::NamespaceMismatch {
			name: spec.name.clone(),
			requested: requested.to_string(),
			managed: namespace.to_string(),
		}),
		_ => Ok(()),
	}
}

/// Live job records keyed by name.
#[async_trait]
pub trait JobStore: Send + Sync {
	/// Namespace every record lives in, when the store is bound to one.
	fn namespace(&self) -> Option<&str> {
		None
	}

	async fn get(&self, name: &str) -> ClusterResult<ClusterJobRecord>;

	/// Create a record from `spec`. Fails with `Conflict` if it exists.
	async fn create(&self, spec: &JobSpec) -> ClusterResult<ClusterJobRecord>;

	/// Persist `record`. Fails with `Conflict` when its version is stale.
	async fn update(&self, record: &ClusterJobRecord) -> ClusterResult<ClusterJobRecord>;

	async fn delete(&self, name: &str) -> ClusterResult<()>;

	async fn list(&self) -> ClusterResult<Vec<ClusterJobRecord>>;
}
