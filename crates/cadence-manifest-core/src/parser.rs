// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Multi-document manifest decoding.
//!
//! A manifest file may concatenate any number of YAML documents separated by
//! `---`. Every document is first decoded into a generic value so its `kind`
//! can be inspected; only `CronJob` documents are converted into [`JobSpec`].

use k8s_openapi::api::batch::v1::CronJob;
use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::error::{ManifestError, ManifestResult};
use crate::types::JobSpec;

/// Kind tag of the documents Cadence manages.
pub const CRON_JOB_KIND: &str = "CronJob";

/// Decode every job document in `bytes`, in document order.
///
/// Documents of other kinds are discarded. A job document that cannot be
/// converted is skipped with a warning. Only a YAML syntax error aborts the
/// whole stream.
pub fn parse_job_specs(bytes: &[u8]) -> ManifestResult<Vec<JobSpec>> {
	let mut specs = Vec::new();

	for (index, document) in serde_yaml::Deserializer::from_slice(bytes).enumerate() {
		let value = Value::deserialize(document).map_err(|source| ManifestError::Decode {
			document: index,
			source,
		})?;

		match decode_document(value) {
			Ok(Some(spec)) => {
				debug!(document = index, job = %spec.name, "decoded job document");
				specs.push(spec);
			}
			Ok(None) => {}
			Err(e) => {
				warn!(document = index, error = %e, "skipping malformed job document");
			}
		}
	}

	Ok(specs)
}

/// Parse `bytes` and return the job called `name`, if declared.
pub fn find_job(bytes: &[u8], name: &str) -> ManifestResult<Option<JobSpec>> {
	Ok(parse_job_specs(bytes)?
		.into_iter()
		.find(|spec| spec.name == name))
}

fn decode_document(value: Value) -> ManifestResult<Option<JobSpec>> {
	if value.is_null() {
		return Ok(None);
	}

	let kind = value.get("kind").and_then(Value::as_str);
	if kind != Some(CRON_JOB_KIND) {
		debug!(kind = ?kind, "ignoring non-job document");
		return Ok(None);
	}

	let cron_job: CronJob =
		serde_yaml::from_value(value).map_err(|e| ManifestError::invalid_job(e.to_string()))?;

	JobSpec::try_from(cron_job).map(Some)
}
