// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cadence server binary.

use std::path::PathBuf;

use cadence_server::{create_router, telemetry, AppState, Services};
use clap::{Parser, Subcommand};

mod version;

/// Cadence server - keeps scheduled jobs in line with their manifests.
#[derive(Parser, Debug)]
#[command(name = "cadence-server", about = "Scheduled job manifest server", version)]
struct Args {
	/// Config file to read instead of /etc/cadence/server.toml
	#[arg(long, env = "CADENCE_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
	/// Run a single index sync, print the report and exit
	Sync,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => cadence_server_config::load_config_with_file(path)?,
		None => cadence_server_config::load_config()?,
	};

	telemetry::init_tracing(&config.logging);

	let services = Services::from_config(&config).await?;

	if let Some(Command::Sync) = args.command {
		let report = services
			.index
			.sync(&config.github.locations, config.sync.timeout())
			.await?;
		println!("{}", serde_json::to_string_pretty(&report)?);
		return Ok(());
	}

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		backend = %config.cluster.backend,
		"starting cadence-server"
	);

	services.scheduler.start().await;

	let app = create_router(AppState::new(services.app.clone()));
	let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
	tracing::info!(addr = %listener.local_addr()?, "Listening");

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	services.scheduler.shutdown().await;
	Ok(())
}
