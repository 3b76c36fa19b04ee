// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cadence_manifest_core::{find_job, parse_job_specs, JobSpec, ManifestLocation, ManifestRoot};
use cadence_server_source::SourceWalker;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::{IndexError, IndexResult};

/// Immutable name -> location map published by one sync.
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
	pub entries: BTreeMap<String, ManifestLocation>,
	/// `None` until the first sync completes.
	pub synced_at: Option<DateTime<Utc>>,
}

impl IndexSnapshot {
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Statistics of one sync cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
	pub roots: usize,
	pub files_scanned: usize,
	pub files_skipped: usize,
	pub directories_skipped: usize,
	pub jobs_indexed: usize,
	pub duplicate_names: usize,
}

pub struct DesiredStateIndex {
	walker: SourceWalker,
	published: RwLock<Arc<IndexSnapshot>>,
	sync_lock: Mutex<()>,
}

impl DesiredStateIndex {
	pub fn new(walker: SourceWalker) -> Self {
		Self {
			walker,
			published: RwLock::new(Arc::new(IndexSnapshot::default())),
			sync_lock: Mutex::new(()),
		}
	}

	/// Rebuild the index from `roots` and publish it.
	///
	/// If the rebuild does not finish within `deadline` it is dropped and the
	/// previous snapshot stays published.
	#[instrument(skip(self, roots), fields(roots = roots.len()))]
	pub async fn sync(&self, roots: &[ManifestRoot], deadline: Duration) -> IndexResult<SyncReport> {
		let _guard = self.sync_lock.lock().await;
		let started = Instant::now();

		let (entries, report) = match tokio::time::timeout(deadline, self.rebuild(roots)).await {
			Ok(built) => built,
			Err(_) => {
				warn!(
					deadline_ms = deadline.as_millis() as u64,
					"index sync timed out, keeping previous snapshot"
				);
				return Err(IndexError::Timeout { deadline });
			}
		};

		let snapshot = Arc::new(IndexSnapshot {
			entries,
			synced_at: Some(Utc::now()),
		});
		*self.published.write() = snapshot;

		info!(
			jobs = report.jobs_indexed,
			files = report.files_scanned,
			files_skipped = report.files_skipped,
			directories_skipped = report.directories_skipped,
			duplicates = report.duplicate_names,
			duration_ms = started.elapsed().as_millis() as u64,
			"index sync complete"
		);

		Ok(report)
	}

	async fn rebuild(&self, roots: &[ManifestRoot]) -> (BTreeMap<String, ManifestLocation>, SyncReport) {
		let mut entries: BTreeMap<String, ManifestLocation> = BTreeMap::new();
		let mut report = SyncReport {
			roots: roots.len(),
			..Default::default()
		};

		for root in roots {
			let listing = self.walker.list_manifest_paths(root).await;
			report.directories_skipped += listing.skipped_directories;

			for location in listing.locations {
				report.files_scanned += 1;

				let bytes = match self.walker.fetch_file(&location).await {
					Ok(bytes) => bytes,
					Err(e) => {
						warn!(location = %location, error = %e, "skipping manifest that could not be fetched");
						report.files_skipped += 1;
						continue;
					}
				};

				let specs = match parse_job_specs(&bytes) {
					Ok(specs) => specs,
					Err(e) => {
						warn!(location = %location, error = %e, "skipping manifest that could not be parsed");
						report.files_skipped += 1;
						continue;
					}
				};

				for spec in specs {
					debug!(job = %spec.name, location = %location, "indexed job");
					if let Some(previous) = entries.insert(spec.name.clone(), location.clone()) {
						warn!(
							job = %spec.name,
							previous = %previous,
							current = %location,
							"duplicate job name, keeping the later definition"
						);
						report.duplicate_names += 1;
					}
				}
			}
		}

		report.jobs_indexed = entries.len();
		(entries, report)
	}

	/// The currently published snapshot.
	pub fn snapshot(&self) -> Arc<IndexSnapshot> {
		self.published.read().clone()
	}

	pub fn lookup(&self, name: &str) -> IndexResult<ManifestLocation> {
		self.snapshot()
			.entries
			.get(name)
			.cloned()
			.ok_or_else(|| IndexError::not_found(name))
	}

	/// Every indexed job name, sorted.
	pub fn names(&self) -> Vec<String> {
		self.snapshot().entries.keys().cloned().collect()
	}

	/// Load the full spec of `name` from its manifest file.
	///
	/// The file is fetched again so the result reflects its current content.
	#[instrument(skip(self))]
	pub async fn get_job(&self, name: &str) -> IndexResult<JobSpec> {
		let location = self.lookup(name)?;
		let bytes = self.walker.fetch_file(&location).await?;

		find_job(&bytes, name)?.ok_or_else(|| {
			warn!(job = %name, location = %location, "job no longer declared at indexed location");
			IndexError::not_found(name)
		})
	}
}
