// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Converts start/stop intents into mutations of live job records.

mod error;
mod reconciler;

pub use error::{ReconcileError, ReconcileResult};
pub use reconciler::{Reconciler, StartOutcome};
