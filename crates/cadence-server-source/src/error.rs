// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for content sources.

use thiserror::Error;

use crate::retry::RetryableError;

/// Result type alias for content source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur when reading from a content source.
#[derive(Debug, Error)]
pub enum SourceError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// Request timed out.
	#[error("Request timed out")]
	Timeout,

	/// Missing or invalid credentials.
	#[error("Unauthorized")]
	Unauthorized,

	/// Credentials lack access to the repository.
	#[error("Forbidden or insufficient permissions")]
	Forbidden,

	/// Rate limit exceeded.
	#[error("Rate limit exceeded")]
	RateLimited,

	/// Path does not exist in the repository.
	#[error("Not found: {path}")]
	NotFound { path: String },

	/// The path exists but is not a regular file.
	#[error("Not a file: {path}")]
	NotAFile { path: String },

	/// Backend returned an unexpected status.
	#[error("API error: {status} - {message}")]
	Api { status: u16, message: String },

	/// Invalid or unparseable response.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),

	/// Configuration error.
	#[error("Configuration error: {0}")]
	Config(String),
}

impl SourceError {
	pub fn api(status: u16, message: impl Into<String>) -> Self {
		Self::Api {
			status,
			message: message.into(),
		}
	}

	pub fn not_found(path: impl Into<String>) -> Self {
		Self::NotFound { path: path.into() }
	}

	/// True when the backend could not be reached or is temporarily unable
	/// to serve, as opposed to rejecting the request.
	pub fn is_transport(&self) -> bool {
		match self {
			SourceError::Network(_) | SourceError::Timeout | SourceError::RateLimited => true,
			SourceError::Api { status, .. } => *status >= 500,
			_ => false,
		}
	}
}

impl RetryableError for SourceError {
	fn is_retryable(&self) -> bool {
		match self {
			SourceError::Network(e) => e.is_retryable(),
			SourceError::Timeout | SourceError::RateLimited => true,
			SourceError::Api { status, .. } => *status >= 500,
			_ => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_retryable_classification() {
		assert!(SourceError::Timeout.is_retryable());
		assert!(SourceError::RateLimited.is_retryable());
		assert!(SourceError::api(502, "Bad Gateway").is_retryable());
		assert!(!SourceError::api(404, "Not Found").is_retryable());
		assert!(!SourceError::not_found("jobs/a.yaml").is_retryable());
		assert!(!SourceError::Unauthorized.is_retryable());
	}

	#[test]
	fn test_transport_classification() {
		assert!(SourceError::Timeout.is_transport());
		assert!(SourceError::api(503, "unavailable").is_transport());
		assert!(!SourceError::Forbidden.is_transport());
		assert!(!SourceError::NotAFile { path: "dir".into() }.is_transport());
	}

	#[test]
	fn test_error_display() {
		let err = SourceError::not_found("jobs/a.yaml");
		assert_eq!(err.to_string(), "Not found: jobs/a.yaml");
	}
}
