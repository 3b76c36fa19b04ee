// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! In-memory job store for tests and local runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use cadence_manifest_core::JobSpec;
use tokio::sync::Mutex;

use crate::error::{ClusterError, ClusterResult};
use crate::store::{ensure_namespace, ClusterJobRecord, JobStore};

/// A call made against a [`MemoryJobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
	Get(String),
	Create(String),
	Update(String),
	Delete(String),
	List,
}

impl StoreOperation {
	/// Whether the operation changes the store.
	pub fn is_mutation(&self) -> bool {
		matches!(
			self,
			StoreOperation::Create(_) | StoreOperation::Update(_) | StoreOperation::Delete(_)
		)
	}
}

#[derive(Default)]
struct State {
	records: BTreeMap<String, ClusterJobRecord>,
	next_version: u64,
	operations: Vec<StoreOperation>,
	fail_next: Option<ClusterError>,
}

impl State {
	fn bump_version(&mut self) -> String {
		self.next_version += 1;
		self.next_version.to_string()
	}
}

/// [`JobStore`] held in memory with the same contract as the Kubernetes
/// store: versions increase on every write and stale updates conflict.
///
/// Every call is recorded, and a failure can be injected for the next call.
#[derive(Default)]
pub struct MemoryJobStore {
	state: Mutex<State>,
	namespace: Option<String>,
}

impl MemoryJobStore {
	/// A store that accepts jobs for any namespace.
	pub fn new() -> Self {
		Self::default()
	}

	/// A store bound to `namespace`, rejecting jobs that name another one.
	pub fn with_namespace(namespace: impl Into<String>) -> Self {
		Self {
			namespace: Some(namespace.into()),
			..Self::default()
		}
	}

	fn check_namespace(&self, spec: &JobSpec) -> ClusterResult<()> {
		match &self.namespace {
			Some(namespace) => ensure_namespace(spec, namespace),
			None => Ok(()),
		}
	}

	/// Insert `spec` directly, bypassing the operation log.
	pub async fn seed(&self, spec: JobSpec) -> ClusterJobRecord {
		let mut state = self.state.lock().await;
		let record = ClusterJobRecord {
			resource_version: Some(state.bump_version()),
			..ClusterJobRecord::new(spec)
		};
		state.records.insert(record.name.clone(), record.clone());
		record
	}

	/// Fail the next call with `err`.
	pub async fn fail_next(&self, err: ClusterError) {
		self.state.lock().await.fail_next = Some(err);
	}

	pub async fn operations(&self) -> Vec<StoreOperation> {
		self.state.lock().await.operations.clone()
	}

	pub async fn clear_operations(&self) {
		self.state.lock().await.operations.clear();
	}

	pub async fn record(&self, name: &str) -> Option<ClusterJobRecord> {
		self.state.lock().await.records.get(name).cloned()
	}

	async fn begin(&self, op: StoreOperation) -> ClusterResult<tokio::sync::MutexGuard<'_, State>> {
		let mut state = self.state.lock().await;
		state.operations.push(op);
		match state.fail_next.take() {
			Some(err) => Err(err),
			None => Ok(state),
		}
	}
}

#[async_trait]
impl JobStore for MemoryJobStore {
	fn namespace(&self) -> Option<&str> {
		self.namespace.as_deref()
	}

	async fn get(&self, name: &str) -> ClusterResult<ClusterJobRecord> {
		let state = self.begin(StoreOperation::Get(name.to_string())).await?;
		state
			.records
			.get(name)
			.cloned()
			.ok_or_else(|| ClusterError::not_found(name))
	}

	async fn create(&self, spec: &JobSpec) -> ClusterResult<ClusterJobRecord> {
		let mut state = self.begin(StoreOperation::Create(spec.name.clone())).await?;
		self.check_namespace(spec)?;
		if state.records.contains_key(&spec.name) {
			return Err(ClusterError::conflict(&spec.name, "already exists"));
		}

		let record = ClusterJobRecord {
			resource_version: Some(state.bump_version()),
			..ClusterJobRecord::new(spec.clone())
		};
		state.records.insert(record.name.clone(), record.clone());
		Ok(record)
	}

	async fn update(&self, record: &ClusterJobRecord) -> ClusterResult<ClusterJobRecord> {
		let mut state = self.begin(StoreOperation::Update(record.name.clone())).await?;
		self.check_namespace(&record.spec)?;
		let current_version = state
			.records
			.get(&record.name)
			.ok_or_else(|| ClusterError::not_found(&record.name))?
			.resource_version
			.clone();

		if record.resource_version.is_some() && record.resource_version != current_version {
			return Err(ClusterError::conflict(
				&record.name,
				"the object has been modified",
			));
		}

		let stored = ClusterJobRecord {
			resource_version: Some(state.bump_version()),
			..record.clone()
		};
		state.records.insert(stored.name.clone(), stored.clone());
		Ok(stored)
	}

	async fn delete(&self, name: &str) -> ClusterResult<()> {
		let mut state = self.begin(StoreOperation::Delete(name.to_string())).await?;
		state
			.records
			.remove(name)
			.map(|_| ())
			.ok_or_else(|| ClusterError::not_found(name))
	}

	async fn list(&self) -> ClusterResult<Vec<ClusterJobRecord>> {
		let state = self.begin(StoreOperation::List).await?;
		Ok(state.records.values().cloned().collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn spec(name: &str) -> JobSpec {
		JobSpec {
			name: name.to_string(),
			schedule: "0 * * * *".to_string(),
			..Default::default()
		}
	}

	#[test]
	fn create_then_get() {
		tokio_test::block_on(async {
			let store = MemoryJobStore::new();
			let created = store.create(&spec("backup")).await.unwrap();
			assert_eq!(created.resource_version.as_deref(), Some("1"));

			let fetched = store.get("backup").await.unwrap();
			assert_eq!(fetched, created);
			assert_eq!(
				store.operations().await,
				vec![
					StoreOperation::Create("backup".to_string()),
					StoreOperation::Get("backup".to_string()),
				]
			);
		});
	}

	#[tokio::test]
	async fn create_existing_conflicts() {
		let store = MemoryJobStore::new();
		store.seed(spec("backup")).await;
		assert!(matches!(
			store.create(&spec("backup")).await,
			Err(ClusterError::Conflict { .. })
		));
	}

	#[tokio::test]
	async fn stale_update_conflicts() {
		let store = MemoryJobStore::new();
		let original = store.seed(spec("backup")).await;

		let updated = store.update(&original.with_suspend(true)).await.unwrap();
		assert_ne!(updated.resource_version, original.resource_version);

		assert!(matches!(
			store.update(&original.with_suspend(false)).await,
			Err(ClusterError::Conflict { .. })
		));
		assert!(store.record("backup").await.unwrap().suspend);
	}

	#[tokio::test]
	async fn missing_records_are_not_found() {
		let store = MemoryJobStore::new();
		assert!(matches!(store.get("nope").await, Err(ClusterError::NotFound { .. })));
		assert!(matches!(store.delete("nope").await, Err(ClusterError::NotFound { .. })));
		assert!(matches!(
			store.update(&ClusterJobRecord::new(spec("nope"))).await,
			Err(ClusterError::NotFound { .. })
		));
	}

	#[tokio::test]
	async fn injected_failure_applies_once() {
		let store = MemoryJobStore::new();
		store
			.fail_next(ClusterError::Transport {
				message: "connection reset".to_string(),
			})
			.await;

		assert!(matches!(store.list().await, Err(ClusterError::Transport { .. })));
		assert!(store.list().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn bound_store_rejects_foreign_namespace() {
		let store = MemoryJobStore::with_namespace("default");
		let in_ops = JobSpec {
			namespace: Some("ops".to_string()),
			..spec("backup")
		};

		assert!(matches!(
			store.create(&in_ops).await,
			Err(ClusterError::NamespaceMismatch { .. })
		));
		assert!(store.record("backup").await.is_none());
		assert!(store.create(&spec("backup")).await.is_ok());
	}

	#[tokio::test]
	async fn mutations_are_flagged() {
		let store = MemoryJobStore::new();
		store.create(&spec("backup")).await.unwrap();
		store.list().await.unwrap();
		store.delete("backup").await.unwrap();

		let mutations: Vec<_> = store
			.operations()
			.await
			.into_iter()
			.filter(StoreOperation::is_mutation)
			.collect();
		assert_eq!(mutations.len(), 2);
	}
}
