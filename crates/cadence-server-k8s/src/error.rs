// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Result type alias for cluster job store operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors that can occur against the cluster job store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
	#[error("Job not found: {name}")]
	NotFound { name: String },

	/// The record already exists or was modified concurrently.
	#[error("Conflict on job {name}: {message}")]
	Conflict { name: String, message: String },

	/// The store could not be reached.
	#[error("Cluster transport error: {message}")]
	Transport { message: String },

	#[error("Cluster API error: {message}")]
	Api { message: String },

	/// A live resource could not be read as a job record.
	#[error("Invalid job record: {message}")]
	InvalidRecord { message: String },

	/// The job asks for a namespace the store does not manage.
	#[error("Job {name} targets namespace {requested}, but this store manages {managed}")]
	NamespaceMismatch {
		name: String,
		requested: String,
		managed: String,
	},
}

impl ClusterError {
	pub fn not_found(name: impl Into<String>) -> Self {
		Self::NotFound { name: name.into() }
	}

	pub fn conflict(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Conflict {
			name: name.into(),
			message: message.into(),
		}
	}

	/// Map a kube error for the resource `name`.
	pub fn from_kube(name: &str, err: kube::Error) -> Self {
		match err {
			kube::Error::Api(resp) if resp.code == 404 => Self::not_found(name),
			kube::Error::Api(resp) if resp.code == 409 => Self::conflict(name, resp.message),
			kube::Error::HyperError(e) => Self::Transport {
				message: e.to_string(),
			},
			kube::Error::Service(e) => Self::Transport {
				message: e.to_string(),
			},
			other => Self::Api {
				message: other.to_string(),
			},
		}
	}
}

impl From<kube::Error> for ClusterError {
	fn from(err: kube::Error) -> Self {
		match err {
			kube::Error::HyperError(e) => ClusterError::Transport {
				message: e.to_string(),
			},
			kube::Error::Service(e) => ClusterError::Transport {
				message: e.to_string(),
			},
			other => ClusterError::Api {
				message: other.to_string(),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use kube::core::ErrorResponse;

	fn api_error(code: u16, message: &str) -> kube::Error {
		kube::Error::Api(ErrorResponse {
			status: "Failure".to_string(),
			message: message.to_string(),
			reason: String::new(),
			code,
		})
	}

	#[test]
	fn maps_status_codes() {
		assert_eq!(
			ClusterError::from_kube("backup", api_error(404, "not found")),
			ClusterError::not_found("backup")
		);
		assert_eq!(
			ClusterError::from_kube("backup", api_error(409, "object has been modified")),
			ClusterError::conflict("backup", "object has been modified")
		);
		assert!(matches!(
			ClusterError::from_kube("backup", api_error(500, "boom")),
			ClusterError::Api { .. }
		));
	}

	#[test]
	fn service_errors_are_transport() {
		let err = kube::Error::Service("connection refused".into());
		assert!(matches!(ClusterError::from(err), ClusterError::Transport { .. }));
	}
}
