// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! CronJob manifest model and parser for Cadence.
//!
//! This crate provides:
//! - The shared data model: manifest roots, manifest locations and [`JobSpec`]
//! - Conversions between [`JobSpec`] and the Kubernetes `CronJob` resource
//! - A multi-document YAML parser that keeps only `CronJob` documents

mod error;
mod parser;
mod types;

pub use error::{ManifestError, ManifestResult};
pub use parser::{find_job, parse_job_specs, CRON_JOB_KIND};
pub use types::{JobSpec, ManifestLocation, ManifestRoot};

pub use k8s_openapi::api::batch::v1::{CronJob, JobTemplateSpec};
