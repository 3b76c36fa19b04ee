// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use cadence_server_config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &LoggingConfig) {
	let registry = tracing_subscriber::registry().with(
		EnvFilter::try_from_default_env().unwrap_or_else(|_| config.level.clone().into()),
	);

	match config.format {
		LogFormat::Json => registry.with(fmt::layer().json()).init(),
		LogFormat::Pretty => registry.with(fmt::layer()).init(),
	}
}
