// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Request facade over the manifest index and the reconciler.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cadence_manifest_core::JobSpec;
use cadence_server_index::DesiredStateIndex;
use cadence_server_reconciler::{Reconciler, StartOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, AppResult};

/// Summary of the published index.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatus {
	pub jobs: usize,
	pub last_sync: Option<DateTime<Utc>>,
}

/// Every operation callers can perform. Each one that touches an external
/// system runs under `request_timeout`.
pub struct JobsApp {
	index: Arc<DesiredStateIndex>,
	reconciler: Reconciler,
	request_timeout: Duration,
}

impl JobsApp {
	pub fn new(index: Arc<DesiredStateIndex>, reconciler: Reconciler, request_timeout: Duration) -> Self {
		Self {
			index,
			reconciler,
			request_timeout,
		}
	}

	pub fn index(&self) -> &Arc<DesiredStateIndex> {
		&self.index
	}

	/// Names of every job found in the manifests, sorted.
	pub fn list_static_names(&self) -> Vec<String> {
		self.index.names()
	}

	#[instrument(skip(self))]
	pub async fn get_static_job(&self, name: &str) -> AppResult<JobSpec> {
		self.with_deadline("get_static_job", async {
			Ok(self.index.get_job(name).await?)
		})
		.await
	}

	/// Names of cluster records that are not suspended, sorted.
	#[instrument(skip(self))]
	pub async fn list_running_names(&self) -> AppResult<Vec<String>> {
		self.with_deadline("list_running_names", async {
			Ok(self.reconciler.get_running_names().await?)
		})
		.await
	}

	/// Resolve `name` from the manifests and make its cluster record run.
	#[instrument(skip(self))]
	pub async fn start_job(&self, name: &str) -> AppResult<StartOutcome> {
		self.with_deadline("start_job", async {
			let spec = self.index.get_job(name).await?;
			Ok(self.reconciler.start_job(&spec).await?)
		})
		.await
	}

	#[instrument(skip(self))]
	pub async fn stop_job(&self, name: &str) -> AppResult<()> {
		self.with_deadline("stop_job", async {
			let spec = self.index.get_job(name).await?;
			Ok(self.reconciler.stop_job(&spec).await?)
		})
		.await
	}

	pub fn status(&self) -> IndexStatus {
		let snapshot = self.index.snapshot();
		IndexStatus {
			jobs: snapshot.len(),
			last_sync: snapshot.synced_at,
		}
	}

	async fn with_deadline<T, F>(&self, operation: &'static str, fut: F) -> AppResult<T>
	where
		F: Future<Output = AppResult<T>>,
	{
		tokio::time::timeout(self.request_timeout, fut)
			.await
			.map_err(|_| AppError::Deadline {
				operation,
				deadline: self.request_timeout,
			})?
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorKind;
	use cadence_manifest_core::ManifestRoot;
	use cadence_server_k8s::{ClusterError, MemoryJobStore, StoreOperation};
	use cadence_server_source::{MemoryContentSource, SourceWalker};

	const BACKUP: &str = r#"apiVersion: batch/v1
kind: CronJob
metadata:
  name: backup
spec:
  schedule: "0 * * * *"
  jobTemplate:
    spec:
      template:
        spec:
          restartPolicy: OnFailure
          containers:
            - name: backup
              image: busybox
"#;

	struct Fixture {
		app: JobsApp,
		source: Arc<MemoryContentSource>,
		store: Arc<MemoryJobStore>,
	}

	async fn fixture(request_timeout: Duration) -> Fixture {
		let source = Arc::new(MemoryContentSource::new());
		source.put_file("acme", "infra", "jobs/backup.yaml", BACKUP);

		let index = Arc::new(DesiredStateIndex::new(SourceWalker::new(source.clone())));
		index
			.sync(&[ManifestRoot::new("acme", "infra", "jobs")], Duration::from_secs(5))
			.await
			.unwrap();

		let store = Arc::new(MemoryJobStore::new());
		let app = JobsApp::new(index, Reconciler::new(store.clone()), request_timeout);
		Fixture { app, source, store }
	}

	#[tokio::test]
	async fn start_then_stop_round_trip() {
		let f = fixture(Duration::from_secs(2)).await;

		assert_eq!(f.app.start_job("backup").await.unwrap(), StartOutcome::Created);
		assert_eq!(f.app.list_running_names().await.unwrap(), vec!["backup"]);

		f.app.stop_job("backup").await.unwrap();
		assert!(f.app.list_running_names().await.unwrap().is_empty());
		assert!(f.store.record("backup").await.unwrap().suspend);
	}

	#[tokio::test]
	async fn unknown_name_never_reaches_the_store() {
		let f = fixture(Duration::from_secs(2)).await;

		let err = f.app.start_job("missing").await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NotFound);
		assert!(f.store.operations().await.is_empty());
	}

	#[tokio::test]
	async fn stop_without_record_is_not_found() {
		let f = fixture(Duration::from_secs(2)).await;

		let err = f.app.stop_job("backup").await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NotFound);
		assert!(!f
			.store
			.operations()
			.await
			.iter()
			.any(StoreOperation::is_mutation));
	}

	#[tokio::test]
	async fn store_conflict_is_reported() {
		let f = fixture(Duration::from_secs(2)).await;
		f.store
			.fail_next(ClusterError::conflict("backup", "the object has been modified"))
			.await;

		let err = f.app.start_job("backup").await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Conflict);
	}

	#[tokio::test(start_paused = true)]
	async fn slow_source_hits_request_deadline() {
		let f = fixture(Duration::from_millis(50)).await;
		f.source.set_read_delay(Some(Duration::from_secs(1)));

		let err = f.app.get_static_job("backup").await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Timeout);
	}

	#[tokio::test]
	async fn status_reflects_snapshot() {
		let f = fixture(Duration::from_secs(2)).await;

		let status = f.app.status();
		assert_eq!(status.jobs, 1);
		assert!(status.last_sync.is_some());
		assert_eq!(f.app.list_static_names(), vec!["backup"]);
	}
}
