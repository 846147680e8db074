use std::process::ExitCode;

use warden_server::config::ServerConfig;
use warden_server::prelude::*;

#[tokio::main]
async fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.init();

	let config = match ServerConfig::from_env() {
		Ok(config) => config,
		Err(err) => {
			error!("FATAL: {}", err);
			return ExitCode::FAILURE;
		}
	};

	match warden_server::app::run(config).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("FATAL: {}", err);
			ExitCode::FAILURE
		}
	}
}

// vim: ts=4
