// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use cadence_manifest_core::ManifestError;
use cadence_server_source::SourceError;
use thiserror::Error;

pub type IndexResult<T> = Result<T, IndexError>;

#[derive(Debug, Error)]
pub enum IndexError {
	#[error("job not found: {name}")]
	NotFound { name: String },

	/// The rebuild was abandoned; the previous snapshot is still published.
	#[error("index sync exceeded its deadline of {deadline:?}")]
	Timeout { deadline: Duration },

	#[error(transparent)]
	Source(#[from] SourceError),

	#[error(transparent)]
	Manifest(#[from] ManifestError),
}

impl IndexError {
	pub fn not_found(name: impl Into<String>) -> Self {
		Self::NotFound { name: name.into() }
	}
}
