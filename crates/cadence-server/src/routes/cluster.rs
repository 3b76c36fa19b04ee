// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Handlers for live cluster records.

use axum::{
	extract::{Path, State},
	response::IntoResponse,
	Json,
};
use cadence_server_reconciler::StartOutcome;
use serde::Serialize;
use tracing::instrument;

use super::jobs::JobNamesResponse;
use crate::{api::AppState, error::AppError};

#[derive(Debug, Serialize)]
pub struct ActionResponse {
	pub success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub outcome: Option<StartOutcome>,
}

/// GET /cluster/jobs - Names of jobs currently scheduled to run.
#[instrument(skip(state))]
pub async fn list_running_jobs(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
	let job_names = state.app.list_running_names().await?;
	Ok(Json(JobNamesResponse { job_names }))
}

/// POST /cluster/jobs/{job_name}/start
#[instrument(skip(state))]
pub async fn start_job(
	State(state): State<AppState>,
	Path(job_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
	let outcome = state.app.start_job(&job_name).await?;
	Ok(Json(ActionResponse {
		success: true,
		outcome: Some(outcome),
	}))
}

/// POST /cluster/jobs/{job_name}/stop
#[instrument(skip(state))]
pub async fn stop_job(
	State(state): State<AppState>,
	Path(job_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
	state.app.stop_job(&job_name).await?;
	Ok(Json(ActionResponse {
		success: true,
		outcome: None,
	}))
}
