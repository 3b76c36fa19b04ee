// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Router construction.

use std::sync::Arc;

use axum::{
	routing::{get, post},
	Router,
};
use tower_http::trace::TraceLayer;

use crate::{app::JobsApp, routes};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	pub app: Arc<JobsApp>,
}

impl AppState {
	pub fn new(app: Arc<JobsApp>) -> Self {
		Self { app }
	}
}

/// Create the API router with all routes.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/static/jobs", get(routes::jobs::list_static_jobs))
		.route("/static/jobs/{job_name}", get(routes::jobs::get_static_job))
		.route("/cluster/jobs", get(routes::cluster::list_running_jobs))
		.route("/cluster/jobs/{job_name}/start", post(routes::cluster::start_job))
		.route("/cluster/jobs/{job_name}/stop", post(routes::cluster::stop_job))
		.with_state(state)
		.layer(TraceLayer::new_for_http())
}
