// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Desired-state index for Cadence.
//!
//! [`DesiredStateIndex`] maps job names to the manifest file that declares
//! them. It is rebuilt wholesale by [`DesiredStateIndex::sync`] and published
//! as an immutable [`IndexSnapshot`], so readers never see a half-built map.
//! [`SyncScheduler`] drives the rebuild in the background.

mod error;
mod index;
mod scheduler;

pub use error::{IndexError, IndexResult};
pub use index::{DesiredStateIndex, IndexSnapshot, SyncReport};
pub use scheduler::{SyncScheduler, SyncSchedulerConfig};
