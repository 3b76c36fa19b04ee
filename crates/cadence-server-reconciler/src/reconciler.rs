// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::sync::Arc;

use cadence_manifest_core::JobSpec;
use cadence_server_k8s::{ensure_namespace, ClusterError, JobStore};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::{ReconcileError, ReconcileResult};

/// A suspended record is deleted and the start retried at most this many times.
const MAX_RECREATE_ATTEMPTS: u32 = 1;

/// What `start_job` did to the live record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StartOutcome {
	Created,
	Updated,
	/// A suspended record was deleted and created again.
	Recreated,
}

impl StartOutcome {
	pub fn as_str(&self) -> &'static str {
		match self {
			StartOutcome::Created => "created",
			StartOutcome::Updated => "updated",
			StartOutcome::Recreated => "recreated",
		}
	}
}

impl fmt::Display for StartOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone)]
pub struct Reconciler {
	store: Arc<dyn JobStore>,
}

impl Reconciler {
	pub fn new(store: Arc<dyn JobStore>) -> Self {
		Self { store }
	}

	/// Names of live records that are not suspended, sorted.
	#[instrument(skip(self))]
	pub async fn get_running_names(&self) -> ReconcileResult<Vec<String>> {
		let mut names: Vec<String> = self
			.store
			.list()
			.await?
			.into_iter()
			.filter(|record| !record.suspend)
			.map(|record| record.name)
			.collect();
		names.sort();
		Ok(names)
	}

	/// Make the live record for `spec` match it and run.
	///
	/// A missing record is created. A running record is updated in place. A
	/// suspended record is deleted and the whole operation retried once.
	#[instrument(skip(self, spec), fields(job = %spec.name))]
	pub async fn start_job(&self, spec: &JobSpec) -> ReconcileResult<StartOutcome> {
		self.check_namespace(spec)?;
		let desired = spec.with_suspend(false);
		let mut recreated = false;

		for attempt in 0..=MAX_RECREATE_ATTEMPTS {
			let record = match self.store.get(&desired.name).await {
				Ok(record) => record,
				Err(ClusterError::NotFound { .. }) => {
					self.store.create(&desired).await?;
					let outcome = if recreated {
						StartOutcome::Recreated
					} else {
						StartOutcome::Created
					};
					info!(outcome = %outcome, "Job started");
					return Ok(outcome);
				}
				Err(e) => return Err(e.into()),
			};

			if !record.suspend {
				self.store.update(&record.with_spec(desired)).await?;
				info!(outcome = %StartOutcome::Updated, "Job started");
				return Ok(StartOutcome::Updated);
			}

			if attempt == MAX_RECREATE_ATTEMPTS {
				break;
			}

			info!("Deleting suspended job before recreating it");
			self.store.delete(&record.name).await?;
			recreated = true;
		}

		warn!("Job still suspended after recreate");
		Err(ReconcileError::StillSuspended {
			name: desired.name,
		})
	}

	/// Suspend the live record for `spec`. Never creates one.
	#[instrument(skip(self, spec), fields(job = %spec.name))]
	pub async fn stop_job(&self, spec: &JobSpec) -> ReconcileResult<()> {
		self.check_namespace(spec)?;
		let record = self.store.get(&spec.name).await?;
		self.store.update(&record.with_suspend(true)).await?;
		info!("Job stopped");
		Ok(())
	}

	/// Reject a job the store cannot place before anything is mutated.
	fn check_namespace(&self, spec: &JobSpec) -> ReconcileResult<()> {
		if let Some(namespace) = self.store.namespace() {
			ensure_namespace(spec, namespace).inspect_err(|e| {
				warn!(error = %e, "Refusing job for another namespace");
			})?;
		}
		Ok(())
	}
}
