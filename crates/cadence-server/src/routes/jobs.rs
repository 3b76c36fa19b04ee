// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Handlers for jobs declared in the manifests.

use axum::{
	extract::{Path, State},
	response::IntoResponse,
	Json,
};
use serde::Serialize;
use tracing::instrument;

use crate::{api::AppState, error::AppError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobNamesResponse {
	pub job_names: Vec<String>,
}

/// GET /static/jobs
pub async fn list_static_jobs(State(state): State<AppState>) -> impl IntoResponse {
	Json(JobNamesResponse {
		job_names: state.app.list_static_names(),
	})
}

/// GET /static/jobs/{job_name}
#[instrument(skip(state))]
pub async fn get_static_job(
	State(state): State<AppState>,
	Path(job_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
	let spec = state.app.get_static_job(&job_name).await?;
	Ok(Json(spec))
}
