// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Health HTTP handler.

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
	pub status: &'static str,
	pub jobs: usize,
	pub last_sync: Option<DateTime<Utc>>,
}

/// GET /health - Report the state of the manifest index.
///
/// A server whose first sync has not finished yet reports `starting`.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let status = state.app.status();

	Json(HealthResponse {
		status: if status.last_sync.is_some() {
			"ok"
		} else {
			"starting"
		},
		jobs: status.jobs,
		last_sync: status.last_sync,
	})
}
