// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use cadence_server_k8s::ClusterError;
use thiserror::Error;

pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[derive(Debug, Error)]
pub enum ReconcileError {
	#[error(transparent)]
	Cluster(#[from] ClusterError),

	/// The record was recreated but came back suspended.
	#[error("job {name} is still suspended after being recreated")]
	StillSuspended { name: String },
}
