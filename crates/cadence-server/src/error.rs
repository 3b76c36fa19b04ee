// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::time::Duration;

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use cadence_manifest_core::ManifestError;
use cadence_server_index::IndexError;
use cadence_server_k8s::ClusterError;
use cadence_server_reconciler::ReconcileError;
use cadence_server_source::SourceError;
use serde::Serialize;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Failure classes reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	NotFound,
	ParseError,
	Timeout,
	Conflict,
	Transport,
	Internal,
}

impl ErrorKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorKind::NotFound => "not_found",
			ErrorKind::ParseError => "parse_error",
			ErrorKind::Timeout => "timeout",
			ErrorKind::Conflict => "conflict",
			ErrorKind::Transport => "transport",
			ErrorKind::Internal => "internal",
		}
	}

	pub fn status_code(&self) -> StatusCode {
		match self {
			ErrorKind::NotFound => StatusCode::NOT_FOUND,
			ErrorKind::ParseError => StatusCode::UNPROCESSABLE_ENTITY,
			ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
			ErrorKind::Conflict => StatusCode::CONFLICT,
			ErrorKind::Transport => StatusCode::BAD_GATEWAY,
			ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

#[derive(Debug, Error)]
pub enum AppError {
	#[error(transparent)]
	Index(#[from] IndexError),

	#[error(transparent)]
	Reconcile(#[from] ReconcileError),

	#[error("{operation} exceeded its deadline of {deadline:?}")]
	Deadline {
		operation: &'static str,
		deadline: Duration,
	},
}

impl AppError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			AppError::Index(e) => index_kind(e),
			AppError::Reconcile(ReconcileError::Cluster(e)) => cluster_kind(e),
			AppError::Reconcile(ReconcileError::StillSuspended { .. }) => ErrorKind::Conflict,
			AppError::Deadline { .. } => ErrorKind::Timeout,
		}
	}
}

fn index_kind(err: &IndexError) -> ErrorKind {
	match err {
		IndexError::NotFound { .. } => ErrorKind::NotFound,
		IndexError::Timeout { .. } => ErrorKind::Timeout,
		IndexError::Manifest(ManifestError::Decode { .. } | ManifestError::InvalidJob { .. }) => {
			ErrorKind::ParseError
		}
		IndexError::Source(e) => source_kind(e),
	}
}

fn source_kind(err: &SourceError) -> ErrorKind {
	match err {
		SourceError::NotFound { .. } => ErrorKind::NotFound,
		SourceError::Timeout => ErrorKind::Timeout,
		e if e.is_transport() => ErrorKind::Transport,
		_ => ErrorKind::Internal,
	}
}

fn cluster_kind(err: &ClusterError) -> ErrorKind {
	match err {
		ClusterError::NotFound { .. } => ErrorKind::NotFound,
		ClusterError::Conflict { .. } => ErrorKind::Conflict,
		ClusterError::Transport { .. } => ErrorKind::Transport,
		ClusterError::NamespaceMismatch { .. } => ErrorKind::ParseError,
		ClusterError::Api { .. } | ClusterError::InvalidRecord { .. } => ErrorKind::Internal,
	}
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub kind: ErrorKind,
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		let kind = self.kind();
		if kind == ErrorKind::Internal {
			tracing::error!(error = %self, "Request failed");
		} else {
			tracing::debug!(error = %self, kind = kind.as_str(), "Request failed");
		}

		(
			kind.status_code(),
			Json(ErrorResponse {
				error: self.to_string(),
				kind,
			}),
		)
			.into_response()
	}
}

/// Errors raised while wiring the server together.
#[derive(Debug, Error)]
pub enum BootstrapError {
	#[error("content source: {0}")]
	Source(#[from] SourceError),

	#[error("cluster store: {0}")]
	Cluster(#[from] ClusterError),
}
