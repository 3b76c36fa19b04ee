// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::Path;
use std::sync::Arc;

use cadence_manifest_core::{ManifestLocation, ManifestRoot};
use tracing::{debug, instrument, warn};

use crate::error::SourceResult;
use crate::source::{ContentKind, ContentSource};

/// Manifest files discovered under one root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestListing {
	/// Candidate files, sorted by path.
	pub locations: Vec<ManifestLocation>,
	/// Directories whose listing failed and were left out.
	pub skipped_directories: usize,
}

/// True for files with a `.yml` or `.yaml` extension (any case).
pub fn is_manifest_path(path: &str) -> bool {
	Path::new(path)
		.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
}

/// Enumerates and fetches manifest files from a [`ContentSource`].
#[derive(Clone)]
pub struct SourceWalker {
	source: Arc<dyn ContentSource>,
}

impl SourceWalker {
	pub fn new(source: Arc<dyn ContentSource>) -> Self {
		Self { source }
	}

	/// Depth-first walk of `root`, collecting manifest files.
	///
	/// A directory that cannot be listed is skipped with a warning and the
	/// walk carries on with the rest of the tree.
	#[instrument(skip(self, root), fields(root = %root))]
	pub async fn list_manifest_paths(&self, root: &ManifestRoot) -> ManifestListing {
		let mut listing = ManifestListing::default();
		let mut pending = vec![root.path.clone()];

		while let Some(dir) = pending.pop() {
			let entries = match self
				.source
				.list_directory(&root.owner, &root.repository, &dir)
				.await
			{
				Ok(entries) => entries,
				Err(e) => {
					warn!(
						owner = %root.owner,
						repo = %root.repository,
						path = %dir,
						error = %e,
						"skipping directory that could not be listed"
					);
					listing.skipped_directories += 1;
					continue;
				}
			};

			for entry in entries {
				match entry.kind {
					ContentKind::Dir => pending.push(entry.path),
					ContentKind::File if is_manifest_path(&entry.path) => {
						listing.locations.push(root.location(entry.path));
					}
					ContentKind::File | ContentKind::Other => {
						debug!(path = %entry.path, "ignoring non-manifest entry");
					}
				}
			}
		}

		listing.locations.sort_by(|a, b| a.path.cmp(&b.path));
		listing
	}

	/// Raw bytes of the file at `location`.
	pub async fn fetch_file(&self, location: &ManifestLocation) -> SourceResult<Vec<u8>> {
		self.source
			.read_file(&location.owner, &location.repository, &location.path)
			.await
	}
}
