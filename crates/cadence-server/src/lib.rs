// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cadence server.
//!
//! Wires the manifest index and the reconciler behind [`JobsApp`] and
//! exposes it over a JSON HTTP API.

pub mod api;
pub mod app;
pub mod bootstrap;
pub mod error;
pub mod routes;
pub mod telemetry;

pub use api::{create_router, AppState};
pub use app::{IndexStatus, JobsApp};
pub use bootstrap::{build_content_source, build_job_store, Services};
pub use error::{AppError, AppResult, BootstrapError, ErrorKind};
