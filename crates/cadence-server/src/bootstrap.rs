// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Builds the long-lived services from resolved configuration.

use std::sync::Arc;

use cadence_server_config::{ClusterBackend, ClusterConfig, GithubConfig, ServerConfig};
use cadence_server_index::{DesiredStateIndex, SyncScheduler, SyncSchedulerConfig};
use cadence_server_k8s::{JobStore, KubeJobStore, MemoryJobStore};
use cadence_server_reconciler::Reconciler;
use cadence_server_source::{
	ContentSource, GithubContentSource, GithubSourceConfig, RetryConfig, SourceWalker,
};
use tracing::{info, warn};

use crate::{app::JobsApp, error::BootstrapError};

pub struct Services {
	pub app: Arc<JobsApp>,
	pub index: Arc<DesiredStateIndex>,
	pub scheduler: SyncScheduler,
}

impl Services {
	/// Wire the index, scheduler and facade over already built backends.
	pub fn assemble(
		config: &ServerConfig,
		source: Arc<dyn ContentSource>,
		store: Arc<dyn JobStore>,
	) -> Self {
		let index = Arc::new(DesiredStateIndex::new(SourceWalker::new(source)));
		let scheduler = SyncScheduler::new(
			Arc::clone(&index),
			SyncSchedulerConfig {
				roots: config.github.locations.clone(),
				interval: config.sync.interval(),
				timeout: config.sync.timeout(),
			},
		);
		let app = Arc::new(JobsApp::new(
			Arc::clone(&index),
			Reconciler::new(store),
			config.http.request_timeout(),
		));

		Self {
			app,
			index,
			scheduler,
		}
	}

	/// Build backends from `config` and wire them.
	pub async fn from_config(config: &ServerConfig) -> Result<Self, BootstrapError> {
		let source = build_content_source(&config.github)?;
		let store = build_job_store(&config.cluster).await?;
		Ok(Self::assemble(config, source, store))
	}
}

fn github_source_config(config: &GithubConfig) -> GithubSourceConfig {
	GithubSourceConfig {
		base_url: config.base_url.clone(),
		git_ref: config.git_ref.clone(),
		token: config.token.clone(),
		retry_config: RetryConfig {
			max_attempts: config.max_retries.saturating_add(1),
			..RetryConfig::default()
		},
		..GithubSourceConfig::default()
	}
}

pub fn build_content_source(config: &GithubConfig) -> Result<Arc<dyn ContentSource>, BootstrapError> {
	let source = GithubContentSource::new(github_source_config(config))?;

	info!(
		base_url = %config.base_url,
		authenticated = config.token.is_some(),
		"GitHub content source initialized"
	);
	Ok(Arc::new(source))
}

pub async fn build_job_store(config: &ClusterConfig) -> Result<Arc<dyn JobStore>, BootstrapError> {
	match config.backend {
		ClusterBackend::Kubernetes => Ok(Arc::new(KubeJobStore::new(&config.namespace).await?)),
		ClusterBackend::Memory => {
			warn!("Using in-memory job store; cluster state is lost on restart");
			Ok(Arc::new(MemoryJobStore::with_namespace(&config.namespace)))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use cadence_manifest_core::ManifestRoot;
	use cadence_server_config::SecretString;
	use cadence_server_source::MemoryContentSource;

	#[tokio::test]
	async fn memory_backend_needs_no_cluster() {
		let config = ClusterConfig {
			backend: ClusterBackend::Memory,
			namespace: "default".to_string(),
		};
		let store = build_job_store(&config).await.unwrap();
		assert!(store.list().await.unwrap().is_empty());
		assert_eq!(store.namespace(), Some("default"));
	}

	#[test]
	fn token_stays_wrapped_for_the_client() {
		let config = GithubConfig {
			token: Some(SecretString::new("ghp_abc123".to_string())),
			max_retries: 2,
			..GithubConfig::default()
		};

		let source_config = github_source_config(&config);
		assert_eq!(
			source_config.token.as_ref().map(|t| t.expose().as_str()),
			Some("ghp_abc123")
		);
		assert_eq!(source_config.retry_config.max_attempts, 3);
		assert!(!format!("{source_config:?}").contains("ghp_abc123"));
	}

	#[test]
	fn github_source_accepts_defaults() {
		assert!(build_content_source(&GithubConfig::default()).is_ok());
	}

	#[tokio::test]
	async fn assembled_scheduler_populates_index() {
		let source = Arc::new(MemoryContentSource::new());
		source.put_file(
			"acme",
			"infra",
			"jobs/backup.yaml",
			"kind: CronJob\nmetadata:\n  name: backup\nspec:\n  schedule: \"0 * * * *\"\n  jobTemplate: {}\n",
		);

		let mut config = ServerConfig::default();
		config.github.locations = vec![ManifestRoot::new("acme", "infra", "jobs")];

		let services = Services::assemble(&config, source, Arc::new(MemoryJobStore::new()));
		services.scheduler.start().await;
		for _ in 0..50 {
			if !services.index.snapshot().is_empty() {
				break;
			}
			tokio::time::sleep(std::time::Duration::from_millis(10)).await;
		}
		services.scheduler.shutdown().await;

		assert_eq!(services.app.list_static_names(), vec!["backup"]);
	}
}
