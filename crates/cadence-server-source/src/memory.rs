// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! In-memory content source for tests and local runs.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{SourceError, SourceResult};
use crate::source::{ContentEntry, ContentSource};

type RepoKey = (String, String);

#[derive(Default)]
struct MemoryTree {
	files: BTreeMap<RepoKey, BTreeMap<String, Vec<u8>>>,
	failing_directories: HashSet<(String, String, String)>,
	read_delay: Option<Duration>,
}

/// File tree held in memory, keyed by owner and repository.
///
/// Directories are implied by file paths. Listing failures and read latency
/// can be injected to exercise the walker and the sync deadline.
#[derive(Default)]
pub struct MemoryContentSource {
	tree: Mutex<MemoryTree>,
	reads: AtomicUsize,
}

impl MemoryContentSource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add or replace the file at `path`.
	pub fn put_file(&self, owner: &str, repo: &str, path: &str, contents: impl Into<Vec<u8>>) {
		self.tree
			.lock()
			.files
			.entry((owner.to_string(), repo.to_string()))
			.or_default()
			.insert(normalize(path).to_string(), contents.into());
	}

	pub fn remove_file(&self, owner: &str, repo: &str, path: &str) {
		if let Some(files) = self
			.tree
			.lock()
			.files
			.get_mut(&(owner.to_string(), repo.to_string()))
		{
			files.remove(normalize(path));
		}
	}

	/// Make every listing of `path` fail with a transient error.
	pub fn fail_directory(&self, owner: &str, repo: &str, path: &str) {
		self.tree.lock().failing_directories.insert((
			owner.to_string(),
			repo.to_string(),
			normalize(path).to_string(),
		));
	}

	pub fn clear_failures(&self) {
		self.tree.lock().failing_directories.clear();
	}

	/// Delay applied to every `read_file` call.
	pub fn set_read_delay(&self, delay: Option<Duration>) {
		self.tree.lock().read_delay = delay;
	}

	/// Number of `read_file` calls served so far.
	pub fn read_count(&self) -> usize {
		self.reads.load(Ordering::SeqCst)
	}
}

fn normalize(path: &str) -> &str {
	path.trim_matches('/')
}

#[async_trait]
impl ContentSource for MemoryContentSource {
	async fn list_directory(
		&self,
		owner: &str,
		repo: &str,
		path: &str,
	) -> SourceResult<Vec<ContentEntry>> {
		let dir = normalize(path);
		let tree = self.tree.lock();

		if tree
			.failing_directories
			.contains(&(owner.to_string(), repo.to_string(), dir.to_string()))
		{
			return Err(SourceError::api(503, format!("listing {dir} unavailable")));
		}

		let files = tree
			.files
			.get(&(owner.to_string(), repo.to_string()))
			.ok_or_else(|| SourceError::not_found(dir))?;

		if files.contains_key(dir) {
			return Ok(vec![ContentEntry::file(dir)]);
		}

		let prefix = if dir.is_empty() {
			String::new()
		} else {
			format!("{dir}/")
		};

		let mut dirs = BTreeSet::new();
		let mut entries = Vec::new();
		for file_path in files.keys() {
			let Some(rest) = file_path.strip_prefix(&prefix) else {
				continue;
			};
			match rest.split_once('/') {
				Some((child, _)) => {
					dirs.insert(format!("{prefix}{child}"));
				}
				None => entries.push(ContentEntry::file(file_path.clone())),
			}
		}

		if dirs.is_empty() && entries.is_empty() {
			return Err(SourceError::not_found(dir));
		}

		entries.extend(dirs.into_iter().map(ContentEntry::dir));
		Ok(entries)
	}

	async fn read_file(&self, owner: &str, repo: &str, path: &str) -> SourceResult<Vec<u8>> {
		self.reads.fetch_add(1, Ordering::SeqCst);

		let delay = self.tree.lock().read_delay;
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}

		let file = normalize(path);
		let tree = self.tree.lock();
		let files = tree
			.files
			.get(&(owner.to_string(), repo.to_string()))
			.ok_or_else(|| SourceError::not_found(file))?;

		if let Some(contents) = files.get(file) {
			return Ok(contents.clone());
		}

		let prefix = format!("{file}/");
		if files.keys().any(|p| p.starts_with(&prefix)) {
			return Err(SourceError::NotAFile {
				path: file.to_string(),
			});
		}

		Err(SourceError::not_found(file))
	}
}
