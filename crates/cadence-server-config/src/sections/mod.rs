// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod cluster;
mod github;
mod http;
mod logging;
mod sync;

pub use cluster::{ClusterBackend, ClusterConfig, ClusterConfigLayer};
pub use github::{parse_locations, GithubConfig, GithubConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use sync::{SyncConfig, SyncConfigLayer};
