// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! GitHub manifest source configuration section.

use cadence_manifest_core::ManifestRoot;
use serde::{Deserialize, Serialize};

use cadence_common_secret::SecretString;

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GithubConfigLayer {
	/// Base URL for the GitHub REST API.
	pub base_url: Option<String>,
	/// Branch, tag or commit to read manifests from.
	pub git_ref: Option<String>,
	#[serde(skip_serializing)]
	pub token: Option<SecretString>,
	/// Manifest trees to index, in the order they are walked.
	pub locations: Option<Vec<ManifestRoot>>,
	pub max_retries: Option<u32>,
}

impl GithubConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.git_ref.is_some() {
			self.git_ref = other.git_ref;
		}
		if other.token.is_some() {
			self.token = other.token;
		}
		if other.locations.is_some() {
			self.locations = other.locations;
		}
		if other.max_retries.is_some() {
			self.max_retries = other.max_retries;
		}
	}

	pub fn finalize(self) -> GithubConfig {
		GithubConfig {
			base_url: self
				.base_url
				.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
			git_ref: self.git_ref,
			token: self.token,
			locations: self.locations.unwrap_or_default(),
			max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
		}
	}
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GithubConfig {
	pub base_url: String,
	pub git_ref: Option<String>,
	#[serde(skip_serializing)]
	pub token: Option<SecretString>,
	pub locations: Vec<ManifestRoot>,
	pub max_retries: u32,
}

impl Default for GithubConfig {
	fn default() -> Self {
		GithubConfigLayer::default().finalize()
	}
}

/// Parse the compact `owner/repo:path,owner/repo:path` form. The `:path`
/// part may be omitted to index the whole repository.
pub fn parse_locations(raw: &str) -> Result<Vec<ManifestRoot>, String> {
	raw.split(',')
		.map(str::trim)
		.filter(|entry| !entry.is_empty())
		.map(|entry| {
			let (repo_part, path) = entry.split_once(':').unwrap_or((entry, ""));
			let (owner, repository) = repo_part
				.split_once('/')
				.filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
				.ok_or_else(|| format!("expected owner/repo[:path], got '{entry}'"))?;
			Ok(ManifestRoot::new(owner, repository, path.trim_matches('/')))
		})
		.collect()
}
