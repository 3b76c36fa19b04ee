// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Manifest content sources for Cadence.
//!
//! This crate provides:
//! - The [`ContentSource`] trait over a version-controlled file tree
//! - A GitHub REST implementation with retry and backoff
//! - An in-memory implementation for tests and local runs
//! - [`SourceWalker`], which enumerates manifest files under a root

mod error;
mod github;
mod memory;
mod retry;
mod source;
mod walker;

pub use error::{SourceError, SourceResult};
pub use github::{GithubContentSource, GithubSourceConfig};
pub use memory::MemoryContentSource;
pub use retry::{retry, RetryConfig, RetryableError};
pub use source::{ContentEntry, ContentKind, ContentSource};
pub use walker::{is_manifest_path, ManifestListing, SourceWalker};
