// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::api::batch::v1::{CronJob, CronJobSpec, JobTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// A configured manifest tree inside a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestRoot {
	pub owner: String,
	pub repository: String,
	/// Directory (or single file) the walk starts from. Empty means the
	/// repository root.
	#[serde(default)]
	pub path: String,
}

impl ManifestRoot {
	pub fn new(
		owner: impl Into<String>,
		repository: impl Into<String>,
		path: impl Into<String>,
	) -> Self {
		Self {
			owner: owner.into(),
			repository: repository.into(),
			path: path.into(),
		}
	}

	/// Location of a file discovered under this root.
	pub fn location(&self, path: impl Into<String>) -> ManifestLocation {
		ManifestLocation {
			owner: self.owner.clone(),
			repository: self.repository.clone(),
			root: self.path.clone(),
			path: path.into(),
		}
	}
}

impl fmt::Display for ManifestRoot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}:{}", self.owner, self.repository, self.path)
	}
}

/// Repository coordinates of one manifest file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestLocation {
	pub owner: String,
	pub repository: String,
	pub root: String,
	pub path: String,
}

impl fmt::Display for ManifestLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}:{}", self.owner, self.repository, self.path)
	}
}

/// Desired configuration of one scheduled job, as declared in a manifest.
///
/// `job_template` is carried through untouched; Cadence never inspects what
/// the job runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub namespace: Option<String>,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub labels: BTreeMap<String, String>,
	pub schedule: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub time_zone: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub concurrency_policy: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub starting_deadline_seconds: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub successful_jobs_history_limit: Option<i32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub failed_jobs_history_limit: Option<i32>,
	#[serde(default)]
	pub suspend: bool,
	#[serde(default)]
	pub job_template: JobTemplateSpec,
}

impl JobSpec {
	/// Copy of this spec with the suspend flag replaced.
	pub fn with_suspend(&self, suspend: bool) -> Self {
		Self {
			suspend,
			..self.clone()
		}
	}

	/// Render as a Kubernetes `CronJob` resource.
	pub fn to_cron_job(&self) -> CronJob {
		CronJob {
			metadata: ObjectMeta {
				name: Some(self.name.clone()),
				namespace: self.namespace.clone(),
				labels: (!self.labels.is_empty()).then(|| self.labels.clone()),
				..Default::default()
			},
			spec: Some(CronJobSpec {
				schedule: self.schedule.clone(),
				time_zone: self.time_zone.clone(),
				concurrency_policy: self.concurrency_policy.clone(),
				starting_deadline_seconds: self.starting_deadline_seconds,
				successful_jobs_history_limit: self.successful_jobs_history_limit,
				failed_jobs_history_limit: self.failed_jobs_history_limit,
				suspend: Some(self.suspend),
				job_template: self.job_template.clone(),
			}),
			status: None,
		}
	}
}

impl TryFrom<CronJob> for JobSpec {
	type Error = ManifestError;

	fn try_from(cron_job: CronJob) -> Result<Self, Self::Error> {
		let name = cron_job
			.metadata
			.name
			.filter(|name| !name.is_empty())
			.ok_or_else(|| ManifestError::invalid_job("metadata.name is missing"))?;

		let spec = cron_job
			.spec
			.ok_or_else(|| ManifestError::invalid_job(format!("job {name} has no spec")))?;

		if spec.schedule.trim().is_empty() {
			return Err(ManifestError::invalid_job(format!(
				"job {name} has an empty schedule"
			)));
		}

		Ok(Self {
			name,
			namespace: cron_job.metadata.namespace,
			labels: cron_job.metadata.labels.unwrap_or_default(),
			schedule: spec.schedule,
			time_zone: spec.time_zone,
			concurrency_policy: spec.concurrency_policy,
			starting_deadline_seconds: spec.starting_deadline_seconds,
			successful_jobs_history_limit: spec.successful_jobs_history_limit,
			failed_jobs_history_limit: spec.failed_jobs_history_limit,
			suspend: spec.suspend.unwrap_or(false),
			job_template: spec.job_template,
		})
	}
}
