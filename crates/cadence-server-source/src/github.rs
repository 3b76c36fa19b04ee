// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! GitHub REST contents API backend.

use std::time::Duration;

use async_trait::async_trait;
use cadence_common_secret::SecretString;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{SourceError, SourceResult};
use crate::retry::{retry, RetryConfig};
use crate::source::{ContentEntry, ContentKind, ContentSource};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = "cadence-server";
const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_RAW: &str = "application/vnd.github.raw+json";

#[derive(Debug, Clone)]
pub struct GithubSourceConfig {
	pub base_url: String,
	/// Branch, tag or commit to read. The repository default branch when unset.
	pub git_ref: Option<String>,
	pub token: Option<SecretString>,
	pub request_timeout: Duration,
	pub retry_config: RetryConfig,
}

impl Default for GithubSourceConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_GITHUB_API_URL.to_string(),
			git_ref: None,
			token: None,
			request_timeout: Duration::from_secs(30),
			retry_config: RetryConfig::default(),
		}
	}
}

/// Item of a contents API response. Directory listings return an array of
/// these without `content`; single files return one with `content` set.
#[derive(Debug, Deserialize)]
struct GitHubContentItem {
	#[serde(rename = "type")]
	kind: String,
	path: String,
	#[serde(default)]
	encoding: Option<String>,
	#[serde(default)]
	content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GitHubContentResponse {
	Listing(Vec<GitHubContentItem>),
	Item(GitHubContentItem),
}

impl GitHubContentItem {
	/// Files over 1 MB come back with `encoding: "none"` and no inline body.
	fn is_truncated(&self) -> bool {
		self.encoding.as_deref() == Some("none")
	}

	fn decode_content(&self) -> SourceResult<Vec<u8>> {
		use base64::{engine::general_purpose::STANDARD, Engine};

		let content = self
			.content
			.as_deref()
			.ok_or_else(|| SourceError::InvalidResponse(format!("no content for {}", self.path)))?;

		match self.encoding.as_deref() {
			None | Some("base64") => {}
			Some(other) => {
				return Err(SourceError::InvalidResponse(format!(
					"unsupported encoding {other} for {}",
					self.path
				)))
			}
		}

		let content_no_newlines: String = content.chars().filter(|c| !c.is_whitespace()).collect();
		STANDARD
			.decode(content_no_newlines)
			.map_err(|e| SourceError::InvalidResponse(format!("base64 decode error: {e}")))
	}
}

/// Reads manifests through `GET repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone)]
pub struct GithubContentSource {
	config: GithubSourceConfig,
	base_url: Url,
	http_client: reqwest::Client,
}

impl GithubContentSource {
	pub fn new(config: GithubSourceConfig) -> SourceResult<Self> {
		let base_url = parse_base_url(&config.base_url)?;

		let http_client = reqwest::Client::builder()
			.timeout(config.request_timeout)
			.build()
			.map_err(|e| SourceError::Config(format!("Failed to create HTTP client: {e}")))?;

		info!(
			base_url = %base_url,
			git_ref = ?config.git_ref,
			authenticated = config.token.is_some(),
			"Created GitHub content source"
		);

		Ok(Self {
			config,
			base_url,
			http_client,
		})
	}

	fn contents_url(&self, owner: &str, repo: &str, path: &str) -> SourceResult<Url> {
		let encoded_path = path
			.split('/')
			.filter(|segment| !segment.is_empty())
			.map(|segment| urlencoding::encode(segment).into_owned())
			.collect::<Vec<_>>()
			.join("/");

		let mut url = self
			.base_url
			.join(&format!("repos/{owner}/{repo}/contents/{encoded_path}"))
			.map_err(|e| SourceError::Config(format!("Invalid URL: {e}")))?;

		if let Some(r) = &self.config.git_ref {
			url.query_pairs_mut().append_pair("ref", r);
		}

		Ok(url)
	}

	async fn send(
		&self,
		owner: &str,
		repo: &str,
		path: &str,
		accept: &str,
	) -> SourceResult<reqwest::Response> {
		let url = self.contents_url(owner, repo, path)?;

		debug!(url = %url, accept, "Fetching contents");

		let mut request = self
			.http_client
			.get(url)
			.header("Accept", accept)
			.header("X-GitHub-Api-Version", "2022-11-28")
			.header("User-Agent", USER_AGENT);

		if let Some(token) = &self.config.token {
			request = request.header("Authorization", format!("Bearer {}", token.expose()));
		}

		let response = request.send().await.map_err(|e| {
			if e.is_timeout() {
				return SourceError::Timeout;
			}
			SourceError::Network(e)
		})?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(map_github_error(status, &body, path));
		}

		Ok(response)
	}

	async fn get_contents_inner(
		&self,
		owner: &str,
		repo: &str,
		path: &str,
	) -> SourceResult<GitHubContentResponse> {
		let response = self.send(owner, repo, path, ACCEPT_JSON).await?;

		response.json().await.map_err(|e| {
			error!(error = %e, "Failed to parse contents response");
			SourceError::InvalidResponse(format!("JSON parse error: {e}"))
		})
	}

	async fn get_contents(
		&self,
		owner: &str,
		repo: &str,
		path: &str,
	) -> SourceResult<GitHubContentResponse> {
		retry(&self.config.retry_config, || {
			self.get_contents_inner(owner, repo, path)
		})
		.await
	}

	async fn get_raw_inner(&self, owner: &str, repo: &str, path: &str) -> SourceResult<Vec<u8>> {
		let response = self.send(owner, repo, path, ACCEPT_RAW).await?;
		let bytes = response.bytes().await.map_err(|e| {
			if e.is_timeout() {
				return SourceError::Timeout;
			}
			SourceError::Network(e)
		})?;
		Ok(bytes.to_vec())
	}

	/// File body through the raw media type, which has no 1 MB limit.
	async fn get_raw(&self, owner: &str, repo: &str, path: &str) -> SourceResult<Vec<u8>> {
		retry(&self.config.retry_config, || self.get_raw_inner(owner, repo, path)).await
	}
}

#[async_trait]
impl ContentSource for GithubContentSource {
	#[instrument(skip(self))]
	async fn list_directory(
		&self,
		owner: &str,
		repo: &str,
		path: &str,
	) -> SourceResult<Vec<ContentEntry>> {
		let items = match self.get_contents(owner, repo, path).await? {
			GitHubContentResponse::Listing(items) => items,
			GitHubContentResponse::Item(item) => vec![item],
		};

		Ok(items
			.into_iter()
			.map(|item| ContentEntry {
				kind: ContentKind::from_github_type(&item.kind),
				path: item.path,
			})
			.collect())
	}

	#[instrument(skip(self))]
	async fn read_file(&self, owner: &str, repo: &str, path: &str) -> SourceResult<Vec<u8>> {
		match self.get_contents(owner, repo, path).await? {
			GitHubContentResponse::Item(item) if item.kind == "file" => {
				let bytes = if item.is_truncated() {
					debug!(path = %item.path, "Content not inlined, fetching raw body");
					self.get_raw(owner, repo, path).await?
				} else {
					item.decode_content()?
				};
				debug!(path = %item.path, size = bytes.len(), "File contents fetched");
				Ok(bytes)
			}
			_ => Err(SourceError::NotAFile {
				path: path.to_string(),
			}),
		}
	}
}

fn parse_base_url(raw: &str) -> SourceResult<Url> {
	let normalized = if raw.ends_with('/') {
		raw.to_string()
	} else {
		format!("{raw}/")
	};

	Url::parse(&normalized).map_err(|e| SourceError::Config(format!("Invalid base URL {raw}: {e}")))
}

fn map_github_error(status: StatusCode, body: &str, path: &str) -> SourceError {
	let status_code = status.as_u16();

	match status_code {
		401 => {
			warn!(status = status_code, "Unauthorized request to GitHub");
			SourceError::Unauthorized
		}
		403 | 429 => {
			let lowered = body.to_lowercase();
			if status_code == 429 || lowered.contains("rate limit") || lowered.contains("api rate") {
				warn!(status = status_code, "GitHub rate limit exceeded");
				SourceError::RateLimited
			} else {
				warn!(status = status_code, "Forbidden request to GitHub");
				SourceError::Forbidden
			}
		}
		404 => SourceError::not_found(path),
		_ => {
			error!(status = status_code, body = %body, "GitHub API error");
			SourceError::api(status_code, body)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use wiremock::matchers::{header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn source_with(base_url: &str, git_ref: Option<&str>) -> GithubContentSource {
		GithubContentSource::new(GithubSourceConfig {
			base_url: base_url.to_string(),
			git_ref: git_ref.map(str::to_string),
			..Default::default()
		})
		.unwrap()
	}

	#[test]
	fn contents_url_encodes_segments_and_ref() {
		let source = source_with("https://api.github.com", Some("main"));
		let url = source
			.contents_url("acme", "infra", "jobs/nightly backup.yaml")
			.unwrap();
		assert_eq!(
			url.as_str(),
			"https://api.github.com/repos/acme/infra/contents/jobs/nightly%20backup.yaml?ref=main"
		);
	}

	#[test]
	fn contents_url_keeps_base_path() {
		let source = source_with("https://ghe.example.com/api/v3", None);
		let url = source.contents_url("acme", "infra", "").unwrap();
		assert_eq!(
			url.as_str(),
			"https://ghe.example.com/api/v3/repos/acme/infra/contents/"
		);
	}

	#[test]
	fn invalid_base_url_is_config_error() {
		let result = GithubContentSource::new(GithubSourceConfig {
			base_url: "not a url".to_string(),
			..Default::default()
		});
		assert!(matches!(result, Err(SourceError::Config(_))));
	}

	#[test]
	fn decodes_listing_and_single_file_responses() {
		let listing = r#"[
			{"type": "dir", "path": "jobs/batch", "name": "batch"},
			{"type": "file", "path": "jobs/a.yaml", "name": "a.yaml"},
			{"type": "symlink", "path": "jobs/link", "name": "link"}
		]"#;
		match serde_json::from_str::<GitHubContentResponse>(listing).unwrap() {
			GitHubContentResponse::Listing(items) => {
				assert_eq!(items.len(), 3);
				assert_eq!(ContentKind::from_github_type(&items[2].kind), ContentKind::Other);
			}
			other => panic!("expected listing, got {other:?}"),
		}

		let file = r#"{"type": "file", "path": "jobs/a.yaml", "encoding": "base64", "content": "a2luZDog\nQ3Jvbkpv\nYg==\n"}"#;
		match serde_json::from_str::<GitHubContentResponse>(file).unwrap() {
			GitHubContentResponse::Item(item) => {
				assert_eq!(item.decode_content().unwrap(), b"kind: CronJob");
			}
			other => panic!("expected item, got {other:?}"),
		}
	}

	#[test]
	fn unsupported_encoding_is_invalid_response() {
		let item = GitHubContentItem {
			kind: "file".to_string(),
			path: "big.yaml".to_string(),
			encoding: Some("utf-16".to_string()),
			content: Some(String::new()),
		};
		assert!(!item.is_truncated());
		assert!(matches!(
			item.decode_content(),
			Err(SourceError::InvalidResponse(_))
		));
	}

	#[tokio::test]
	async fn inline_file_is_decoded_with_token() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/repos/acme/infra/contents/jobs/a.yaml"))
			.and(header("Accept", ACCEPT_JSON))
			.and(header("Authorization", "Bearer ghp_abc"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"type": "file",
				"path": "jobs/a.yaml",
				"encoding": "base64",
				"content": "a2luZDog\nQ3Jvbkpv\nYg==\n",
			})))
			.expect(1)
			.mount(&server)
			.await;

		let source = GithubContentSource::new(GithubSourceConfig {
			base_url: server.uri(),
			token: Some(SecretString::new("ghp_abc".to_string())),
			..Default::default()
		})
		.unwrap();

		let bytes = source.read_file("acme", "infra", "jobs/a.yaml").await.unwrap();
		assert_eq!(bytes, b"kind: CronJob");
	}

	#[tokio::test]
	async fn large_file_is_fetched_raw() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/repos/acme/infra/contents/jobs/big.yaml"))
			.and(header("Accept", ACCEPT_JSON))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"type": "file",
				"path": "jobs/big.yaml",
				"encoding": "none",
				"content": "",
			})))
			.expect(1)
			.mount(&server)
			.await;
		Mock::given(method("GET"))
			.and(path("/repos/acme/infra/contents/jobs/big.yaml"))
			.and(header("Accept", ACCEPT_RAW))
			.respond_with(ResponseTemplate::new(200).set_body_bytes(b"kind: CronJob\n".to_vec()))
			.expect(1)
			.mount(&server)
			.await;

		let source = source_with(&server.uri(), None);
		let bytes = source.read_file("acme", "infra", "jobs/big.yaml").await.unwrap();
		assert_eq!(bytes, b"kind: CronJob\n");
	}

	#[tokio::test]
	async fn directory_read_is_not_a_file() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/repos/acme/infra/contents/jobs"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!([
				{"type": "file", "path": "jobs/a.yaml"},
			])))
			.mount(&server)
			.await;

		let source = source_with(&server.uri(), None);
		assert!(matches!(
			source.read_file("acme", "infra", "jobs").await,
			Err(SourceError::NotAFile { .. })
		));
	}

	#[test]
	fn maps_error_statuses() {
		assert!(matches!(
			map_github_error(StatusCode::UNAUTHORIZED, "", "p"),
			SourceError::Unauthorized
		));
		assert!(matches!(
			map_github_error(StatusCode::FORBIDDEN, "API rate limit exceeded", "p"),
			SourceError::RateLimited
		));
		assert!(matches!(
			map_github_error(StatusCode::FORBIDDEN, "Resource not accessible", "p"),
			SourceError::Forbidden
		));
		assert!(matches!(
			map_github_error(StatusCode::NOT_FOUND, "", "jobs/a.yaml"),
			SourceError::NotFound { path } if path == "jobs/a.yaml"
		));
		assert!(matches!(
			map_github_error(StatusCode::BAD_GATEWAY, "oops", "p"),
			SourceError::Api { status: 502, .. }
		));
	}

	#[test]
	fn debug_redacts_token() {
		let config = GithubSourceConfig {
			token: Some(SecretString::new("ghp_secret".to_string())),
			..Default::default()
		};
		let debug = format!("{config:?}");
		assert!(!debug.contains("ghp_secret"));
		assert!(debug.contains("[REDACTED]"));
	}
}
