// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files and environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::env::load_secret_with;
use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	parse_locations, ClusterConfigLayer, GithubConfigLayer, HttpConfigLayer, LoggingConfigLayer,
	SyncConfigLayer,
};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/cadence/server.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(DEFAULT_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment variable source.
///
/// Convention: CADENCE_SERVER_<SECTION>_<FIELD>
pub struct EnvSource {
	lookup: Lookup,
}

impl Default for EnvSource {
	fn default() -> Self {
		Self {
			lookup: Box::new(|name| std::env::var(name).ok()),
		}
	}
}

impl EnvSource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Read variables through `lookup` instead of the process environment.
	pub fn with_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String> + Send + Sync + 'static,
	{
		Self {
			lookup: Box::new(lookup),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.is_empty())
	}

	fn parsed<T>(&self, name: &str) -> Result<Option<T>, ConfigError>
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		match self.var(name) {
			Some(v) => v
				.parse()
				.map(Some)
				.map_err(|e| ConfigError::invalid_value(name, format!("invalid value '{v}': {e}"))),
			None => Ok(None),
		}
	}

	fn load_http(&self) -> Result<HttpConfigLayer, ConfigError> {
		Ok(HttpConfigLayer {
			host: self.var("CADENCE_SERVER_HTTP_HOST"),
			port: self.parsed("CADENCE_SERVER_HTTP_PORT")?,
			request_timeout_secs: self.parsed("CADENCE_SERVER_HTTP_REQUEST_TIMEOUT_SECS")?,
		})
	}

	fn load_github(&self) -> Result<GithubConfigLayer, ConfigError> {
		let locations = self
			.var("CADENCE_SERVER_GITHUB_LOCATIONS")
			.map(|raw| {
				parse_locations(&raw)
					.map_err(|e| ConfigError::invalid_value("CADENCE_SERVER_GITHUB_LOCATIONS", e))
			})
			.transpose()?;

		let token = load_secret_with("CADENCE_SERVER_GITHUB_TOKEN", |name| (self.lookup)(name))
			.map_err(|e| ConfigError::Secret(e.to_string()))?;

		Ok(GithubConfigLayer {
			base_url: self.var("CADENCE_SERVER_GITHUB_BASE_URL"),
			git_ref: self.var("CADENCE_SERVER_GITHUB_GIT_REF"),
			token,
			locations,
			max_retries: self.parsed("CADENCE_SERVER_GITHUB_MAX_RETRIES")?,
		})
	}

	fn load_sync(&self) -> Result<SyncConfigLayer, ConfigError> {
		Ok(SyncConfigLayer {
			interval_secs: self.parsed("CADENCE_SERVER_SYNC_INTERVAL_SECS")?,
			timeout_secs: self.parsed("CADENCE_SERVER_SYNC_TIMEOUT_SECS")?,
		})
	}

	fn load_cluster(&self) -> Result<ClusterConfigLayer, ConfigError> {
		Ok(ClusterConfigLayer {
			backend: self.parsed("CADENCE_SERVER_CLUSTER_BACKEND")?,
			namespace: self.var("CADENCE_SERVER_CLUSTER_NAMESPACE"),
		})
	}

	fn load_logging(&self) -> Result<LoggingConfigLayer, ConfigError> {
		Ok(LoggingConfigLayer {
			level: self.var("CADENCE_SERVER_LOGGING_LEVEL"),
			format: self.parsed("CADENCE_SERVER_LOGGING_FORMAT")?,
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(self.load_http()?),
			github: Some(self.load_github()?),
			sync: Some(self.load_sync()?),
			cluster: Some(self.load_cluster()?),
			logging: Some(self.load_logging()?),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sections::{ClusterBackend, LogFormat};
	use cadence_manifest_core::ManifestRoot;
	use std::collections::HashMap;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn env_from(pairs: &[(&str, &str)]) -> EnvSource {
		let vars: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		EnvSource::with_lookup(move |name| vars.get(name).cloned())
	}

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn test_missing_toml_file_is_skipped() {
		let layer = TomlSource::new("/nonexistent/cadence/server.toml")
			.load()
			.unwrap();
		assert!(layer.http.is_none());
	}

	#[test]
	fn test_toml_file_is_loaded() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[sync]
interval_secs = 60

[cluster]
backend = "memory"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.sync.unwrap().interval_secs, Some(60));
		assert_eq!(layer.cluster.unwrap().backend, Some(ClusterBackend::Memory));
	}

	#[test]
	fn test_invalid_toml_reports_path() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "[http\nport = ").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { ref path, .. } if path == file.path()));
	}

	#[test]
	fn test_env_source_reads_every_section() {
		let env = env_from(&[
			("CADENCE_SERVER_HTTP_PORT", "9000"),
			("CADENCE_SERVER_GITHUB_LOCATIONS", "acme/infra:jobs"),
			("CADENCE_SERVER_GITHUB_TOKEN", "ghp_abc"),
			("CADENCE_SERVER_SYNC_TIMEOUT_SECS", "30"),
			("CADENCE_SERVER_CLUSTER_NAMESPACE", "batch"),
			("CADENCE_SERVER_LOGGING_FORMAT", "json"),
		]);

		let layer = env.load().unwrap();

		assert_eq!(layer.http.unwrap().port, Some(9000));
		let github = layer.github.unwrap();
		assert_eq!(
			github.locations,
			Some(vec![ManifestRoot::new("acme", "infra", "jobs")])
		);
		assert_eq!(github.token.unwrap().expose(), "ghp_abc");
		assert_eq!(layer.sync.unwrap().timeout_secs, Some(30));
		assert_eq!(layer.cluster.unwrap().namespace.as_deref(), Some("batch"));
		assert_eq!(layer.logging.unwrap().format, Some(LogFormat::Json));
	}

	#[test]
	fn test_empty_env_values_are_ignored() {
		let layer = env_from(&[("CADENCE_SERVER_HTTP_HOST", "")]).load().unwrap();
		assert!(layer.http.unwrap().host.is_none());
	}

	#[test]
	fn test_invalid_env_value() {
		let err = env_from(&[("CADENCE_SERVER_HTTP_PORT", "eighty")])
			.load()
			.unwrap_err();
		assert!(
			matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "CADENCE_SERVER_HTTP_PORT")
		);

		let err = env_from(&[("CADENCE_SERVER_CLUSTER_BACKEND", "nomad")])
			.load()
			.unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { .. }));
	}
}
