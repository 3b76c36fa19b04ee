// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors that can occur while decoding manifests.
#[derive(Error, Debug)]
pub enum ManifestError {
	/// The YAML stream could not be decoded before reaching end of input.
	#[error("failed to decode manifest document {document}: {source}")]
	Decode {
		document: usize,
		#[source]
		source: serde_yaml::Error,
	},

	/// A document had the job kind but not the shape of a job.
	#[error("invalid job document: {message}")]
	InvalidJob { message: String },
}

impl ManifestError {
	pub fn invalid_job(message: impl Into<String>) -> Self {
		Self::InvalidJob {
			message: message.into(),
		}
	}
}
