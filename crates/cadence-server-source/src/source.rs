// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

use crate::error::SourceResult;

/// Kind of an entry in a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
	Dir,
	File,
	/// Symlinks, submodules and anything else the walker does not follow.
	Other,
}

impl ContentKind {
	pub fn from_github_type(kind: &str) -> Self {
		match kind {
			"dir" => Self::Dir,
			"file" => Self::File,
			_ => Self::Other,
		}
	}
}

/// One entry of a directory listing. `path` is relative to the repository
/// root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
	pub kind: ContentKind,
	pub path: String,
}

impl ContentEntry {
	pub fn dir(path: impl Into<String>) -> Self {
		Self {
			kind: ContentKind::Dir,
			path: path.into(),
		}
	}

	pub fn file(path: impl Into<String>) -> Self {
		Self {
			kind: ContentKind::File,
			path: path.into(),
		}
	}
}

/// Read access to a version-controlled file tree.
#[async_trait]
pub trait ContentSource: Send + Sync {
	/// List the entries directly under `path`. Listing a regular file yields
	/// that single file.
	async fn list_directory(
		&self,
		owner: &str,
		repo: &str,
		path: &str,
	) -> SourceResult<Vec<ContentEntry>>;

	/// Read the raw bytes of the file at `path`.
	async fn read_file(&self, owner: &str, repo: &str, path: &str) -> SourceResult<Vec<u8>>;
}
