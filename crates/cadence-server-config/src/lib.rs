// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for Cadence server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`CADENCE_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use cadence_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod env;
pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use env::load_secret_env;
pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use cadence_common_secret::{Secret, SecretString};
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, DEFAULT_CONFIG_PATH};

use std::path::PathBuf;

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub github: GithubConfig,
	pub sync: SyncConfig,
	pub cluster: ClusterConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`CADENCE_SERVER_*`)
/// 2. Config file (`/etc/cadence/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_config_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource::new()),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	load_config_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource::new()),
	])
}

/// Merge `sources` in precedence order and validate the result.
pub fn load_config_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let config = ServerConfig {
		http: layer.http.unwrap_or_default().finalize(),
		github: layer.github.unwrap_or_default().finalize(),
		sync: layer.sync.unwrap_or_default().finalize(),
		cluster: layer.cluster.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		addr = %config.socket_addr(),
		locations = config.github.locations.len(),
		git_ref = ?config.github.git_ref,
		github_authenticated = config.github.token.is_some(),
		sync_interval_secs = config.sync.interval_secs,
		cluster_backend = %config.cluster.backend,
		namespace = %config.cluster.namespace,
		"Server configuration loaded"
	);

	Ok(config)
}

/// Validate cross-field configuration rules.
fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
	if config.github.locations.is_empty() {
		return Err(ConfigError::Validation(
			"no manifest locations configured. Set CADENCE_SERVER_GITHUB_LOCATIONS or \
			 [[github.locations]] in the config file."
				.to_string(),
		));
	}

	if !(config.github.base_url.starts_with("https://")
		|| config.github.base_url.starts_with("http://"))
	{
		return Err(ConfigError::invalid_value(
			"github.base_url",
			format!("'{}' is not an http(s) URL", config.github.base_url),
		));
	}

	for (key, value) in [
		("sync.interval_secs", config.sync.interval_secs),
		("sync.timeout_secs", config.sync.timeout_secs),
		("http.request_timeout_secs", config.http.request_timeout_secs),
	] {
		if value == 0 {
			return Err(ConfigError::invalid_value(key, "must be greater than zero"));
		}
	}

	Ok(())
}
