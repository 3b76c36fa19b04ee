// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Index sync configuration section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_INTERVAL_SECS: u64 = 300;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncConfigLayer {
	pub interval_secs: Option<u64>,
	pub timeout_secs: Option<u64>,
}

impl SyncConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.interval_secs.is_some() {
			self.interval_secs = other.interval_secs;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
	}

	pub fn finalize(self) -> SyncConfig {
		SyncConfig {
			interval_secs: self.interval_secs.unwrap_or(DEFAULT_INTERVAL_SECS),
			timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
	pub interval_secs: u64,
	/// Deadline for a single sync cycle.
	pub timeout_secs: u64,
}

impl SyncConfig {
	pub fn interval(&self) -> Duration {
		Duration::from_secs(self.interval_secs)
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}
}

impl Default for SyncConfig {
	fn default() -> Self {
		SyncConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_values() {
		let config = SyncConfig::default();
		assert_eq!(config.interval(), Duration::from_secs(300));
		assert_eq!(config.timeout(), Duration::from_secs(120));
	}

	#[test]
	fn test_layer_finalize_with_values() {
		let config = SyncConfigLayer {
			interval_secs: Some(60),
			timeout_secs: Some(30),
		}
		.finalize();
		assert_eq!(config.interval_secs, 60);
		assert_eq!(config.timeout_secs, 30);
	}
}
