// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;
use std::time::Duration;

use cadence_manifest_core::ManifestRoot;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument};

use crate::index::DesiredStateIndex;

#[derive(Debug, Clone)]
pub struct SyncSchedulerConfig {
	pub roots: Vec<ManifestRoot>,
	pub interval: Duration,
	/// Deadline for a single sync cycle.
	pub timeout: Duration,
}

impl SyncSchedulerConfig {
	pub fn new(roots: Vec<ManifestRoot>) -> Self {
		Self {
			roots,
			interval: Duration::from_secs(300),
			timeout: Duration::from_secs(120),
		}
	}
}

/// Runs [`DesiredStateIndex::sync`] in the background: once right away, then
/// every `interval`. Cycles run one after another in a single task.
pub struct SyncScheduler {
	index: Arc<DesiredStateIndex>,
	config: SyncSchedulerConfig,
	shutdown_tx: broadcast::Sender<()>,
	handle: Mutex<Option<JoinHandle<()>>>,
}

impl SyncScheduler {
	pub fn new(index: Arc<DesiredStateIndex>, config: SyncSchedulerConfig) -> Self {
		let (shutdown_tx, _) = broadcast::channel(1);
		Self {
			index,
			config,
			shutdown_tx,
			handle: Mutex::new(None),
		}
	}

	/// Spawn the sync task. Calling it again while running is a no-op.
	#[instrument(skip(self))]
	pub async fn start(&self) {
		let mut handle = self.handle.lock().await;
		if handle.is_some() {
			return;
		}

		let index = Arc::clone(&self.index);
		let config = self.config.clone();
		let mut shutdown_rx = self.shutdown_tx.subscribe();

		*handle = Some(tokio::spawn(async move {
			let mut ticker = tokio::time::interval(config.interval);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

			loop {
				tokio::select! {
					biased;
					_ = shutdown_rx.recv() => {
						info!("Shutting down index sync");
						break;
					}
					_ = ticker.tick() => {
						run_cycle(&index, &config).await;
					}
				}
			}
		}));

		info!(
			roots = self.config.roots.len(),
			interval_secs = self.config.interval.as_secs(),
			timeout_secs = self.config.timeout.as_secs(),
			"Index sync scheduler started"
		);
	}

	/// Signal the task to stop and wait for it. An in-flight cycle runs to
	/// completion or to its own deadline first.
	#[instrument(skip(self))]
	pub async fn shutdown(&self) {
		let _ = self.shutdown_tx.send(());

		if let Some(handle) = self.handle.lock().await.take() {
			if let Err(e) = handle.await {
				error!(error = %e, "Index sync task panicked");
			}
		}

		info!("Index sync scheduler shut down");
	}

	pub async fn is_running(&self) -> bool {
		self.handle
			.lock()
			.await
			.as_ref()
			.is_some_and(|handle| !handle.is_finished())
	}
}

async fn run_cycle(index: &DesiredStateIndex, config: &SyncSchedulerConfig) {
	if let Err(e) = index.sync(&config.roots, config.timeout).await {
		error!(error = %e, "Index sync cycle failed");
	}
}
