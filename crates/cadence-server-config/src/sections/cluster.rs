// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cluster job store configuration section.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const DEFAULT_NAMESPACE: &str = "default";

/// Which job store backs the reconciler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterBackend {
	#[default]
	Kubernetes,
	/// In-process store; nothing reaches a real cluster.
	Memory,
}

impl FromStr for ClusterBackend {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"kubernetes" | "k8s" => Ok(Self::Kubernetes),
			"memory" => Ok(Self::Memory),
			other => Err(format!("unknown cluster backend '{other}'")),
		}
	}
}

impl fmt::Display for ClusterBackend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Kubernetes => f.write_str("kubernetes"),
			Self::Memory => f.write_str("memory"),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClusterConfigLayer {
	pub backend: Option<ClusterBackend>,
	pub namespace: Option<String>,
}

impl ClusterConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.backend.is_some() {
			self.backend = other.backend;
		}
		if other.namespace.is_some() {
			self.namespace = other.namespace;
		}
	}

	pub fn finalize(self) -> ClusterConfig {
		ClusterConfig {
			backend: self.backend.unwrap_or_default(),
			namespace: self
				.namespace
				.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterConfig {
	pub backend: ClusterBackend,
	pub namespace: String,
}

impl Default for ClusterConfig {
	fn default() -> Self {
		ClusterConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_values() {
		let config = ClusterConfig::default();
		assert_eq!(config.backend, ClusterBackend::Kubernetes);
		assert_eq!(config.namespace, "default");
	}

	#[test]
	fn test_backend_parsing() {
		assert_eq!("memory".parse::<ClusterBackend>(), Ok(ClusterBackend::Memory));
		assert_eq!("K8S".parse::<ClusterBackend>(), Ok(ClusterBackend::Kubernetes));
		assert!("nomad".parse::<ClusterBackend>().is_err());
	}

	#[test]
	fn test_deserialize_layer() {
		let layer: ClusterConfigLayer =
			toml::from_str("backend = \"memory\"\nnamespace = \"jobs\"").unwrap();
		assert_eq!(layer.backend, Some(ClusterBackend::Memory));
		assert_eq!(layer.namespace.as_deref(), Some("jobs"));
	}
}
