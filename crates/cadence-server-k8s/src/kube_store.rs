// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use cadence_manifest_core::{CronJob, JobSpec};
use kube::{
	api::{Api, DeleteParams, ListParams, PostParams},
	Client,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{ClusterError, ClusterResult};
use crate::store::{ensure_namespace, ClusterJobRecord, JobStore};

/// [`JobStore`] over `CronJob` resources in one namespace. Jobs whose
/// manifest names another namespace are rejected.
#[derive(Clone)]
pub struct KubeJobStore {
	client: Client,
	namespace: String,
}

impl KubeJobStore {
	/// Connect using the in-cluster or kubeconfig credentials.
	pub async fn new(namespace: impl Into<String>) -> ClusterResult<Self> {
		let client = Client::try_default().await?;
		let namespace = namespace.into();
		info!(namespace = %namespace, "K8s job store initialized");
		Ok(Self::with_client(client, namespace))
	}

	pub fn with_client(client: Client, namespace: impl Into<String>) -> Self {
		Self {
			client,
			namespace: namespace.into(),
		}
	}

	fn api(&self) -> Api<CronJob> {
		Api::namespaced(self.client.clone(), &self.namespace)
	}

	fn resource(&self, record: &ClusterJobRecord) -> ClusterResult<CronJob> {
		ensure_namespace(&record.spec, &self.namespace)?;
		let mut cron_job = record.to_cron_job();
		cron_job.metadata.namespace = Some(self.namespace.clone());
		Ok(cron_job)
	}
}

#[async_trait]
impl JobStore for KubeJobStore {
	fn namespace(&self) -> Option<&str> {
		Some(&self.namespace)
	}

	#[instrument(skip(self), fields(namespace = %self.namespace))]
	async fn get(&self, name: &str) -> ClusterResult<ClusterJobRecord> {
		let cron_job = self
			.api()
			.get(name)
			.await
			.map_err(|e| ClusterError::from_kube(name, e))?;
		ClusterJobRecord::try_from(cron_job)
	}

	#[instrument(skip(self, spec), fields(namespace = %self.namespace, job = %spec.name))]
	async fn create(&self, spec: &JobSpec) -> ClusterResult<ClusterJobRecord> {
		let cron_job = self.resource(&ClusterJobRecord::new(spec.clone()))?;
		let created = self
			.api()
			.create(&PostParams::default(), &cron_job)
			.await
			.map_err(|e| ClusterError::from_kube(&spec.name, e))?;
		debug!("CronJob created");
		ClusterJobRecord::try_from(created)
	}

	#[instrument(skip(self, record), fields(namespace = %self.namespace, job = %record.name))]
	async fn update(&self, record: &ClusterJobRecord) -> ClusterResult<ClusterJobRecord> {
		let cron_job = self.resource(record)?;
		let replaced = self
			.api()
			.replace(&record.name, &PostParams::default(), &cron_job)
			.await
			.map_err(|e| ClusterError::from_kube(&record.name, e))?;
		debug!(suspend = record.suspend, "CronJob replaced");
		ClusterJobRecord::try_from(replaced)
	}

	#[instrument(skip(self), fields(namespace = %self.namespace))]
	async fn delete(&self, name: &str) -> ClusterResult<()> {
		self.api()
			.delete(name, &DeleteParams::background())
			.await
			.map_err(|e| ClusterError::from_kube(name, e))?;
		debug!("CronJob deleted");
		Ok(())
	}

	#[instrument(skip(self), fields(namespace = %self.namespace))]
	async fn list(&self) -> ClusterResult<Vec<ClusterJobRecord>> {
		let cron_jobs = self.api().list(&ListParams::default()).await?;

		Ok(cron_jobs
			.items
			.into_iter()
			.filter_map(|cron_job| {
				let name = cron_job.metadata.name.clone().unwrap_or_default();
				match ClusterJobRecord::try_from(cron_job) {
					Ok(record) => Some(record),
					Err(e) => {
						warn!(job = %name, error = %e, "Skipping unreadable CronJob");
						None
					}
				}
			})
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn store() -> KubeJobStore {
		let config = kube::Config::new("http://127.0.0.1:9".parse().unwrap());
		KubeJobStore::with_client(Client::try_from(config).unwrap(), "default")
	}

	fn spec(namespace: Option<&str>) -> JobSpec {
		JobSpec {
			name: "backup".to_string(),
			namespace: namespace.map(str::to_string),
			schedule: "0 * * * *".to_string(),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn resource_is_placed_in_store_namespace() {
		let store = store();
		for namespace in [None, Some("default")] {
			let cron_job = store
				.resource(&ClusterJobRecord::new(spec(namespace)))
				.unwrap();
			assert_eq!(cron_job.metadata.namespace.as_deref(), Some("default"));
		}
	}

	#[tokio::test]
	async fn foreign_namespace_never_reaches_the_api() {
		let store = store();
		assert!(matches!(
			store.resource(&ClusterJobRecord::new(spec(Some("ops")))),
			Err(ClusterError::NamespaceMismatch { .. })
		));
		assert!(matches!(
			store.create(&spec(Some("ops"))).await,
			Err(ClusterError::NamespaceMismatch { ref requested, .. }) if requested == "ops"
		));
		assert_eq!(JobStore::namespace(&store), Some("default"));
	}
}
