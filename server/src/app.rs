//! App state and server lifecycle

use std::net::SocketAddr;
use std::sync::Arc;

use rustls::crypto::{CryptoProvider, aws_lc_rs};
use tokio::net::TcpListener;

use warden_core::Warden;
use warden_core::notifier::LogNotifyAdapter;
use warden_notify_adapter_webhook::NotifyAdapterWebhook;
use warden_store_adapter_sqlite::StoreAdapterSqlite;
use warden_types::notify_adapter::NotifyAdapter;

use crate::config::ServerConfig;
use crate::prelude::*;
use crate::routes;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug)]
pub struct AppState {
	pub warden: Warden,
	pub admin_token: Option<Box<str>>,
}

pub type App = Arc<AppState>;

impl AppState {
	pub fn new(warden: Warden, admin_token: Option<Box<str>>) -> App {
		Arc::new(Self { warden, admin_token })
	}
}

/// Open the adapters, start the guard and serve until interrupted
pub async fn run(config: ServerConfig) -> WdResult<()> {
	info!("Warden V{}", VERSION);

	// Ignore the error when a provider is already installed
	let _ = CryptoProvider::install_default(aws_lc_rs::default_provider());

	if let Some(dir) = config.db_path.parent() {
		tokio::fs::create_dir_all(dir).await?;
	}
	let store = Arc::new(StoreAdapterSqlite::new(&config.db_path).await?);

	let notify: Arc<dyn NotifyAdapter> = if let Some(url) = &config.webhook_url {
		info!("Alerts are delivered to the configured webhook");
		Arc::new(NotifyAdapterWebhook::new(url, config.webhook_timeout)?)
	} else {
		info!("No WEBHOOK_URL set, alerts are written to the log");
		Arc::new(LogNotifyAdapter)
	};

	let warden = Warden::new(config.guard.clone(), store, Some(notify));
	warden.start();

	let app = AppState::new(warden.clone(), config.admin_token.clone());
	let router = routes::init(app, config.tier_header.clone());

	let listener = TcpListener::bind(config.listen).await?;
	info!("Listening on HTTP {}", config.listen);

	let res = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
		.with_graceful_shutdown(shutdown_signal())
		.await;

	warden.stop();
	info!("Shut down");
	res.map_err(Error::from)
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		warn!("Failed to listen for shutdown signal: {}", err);
		std::future::pending::<()>().await;
	}
	info!("Shutdown signal received");
}

// vim: ts=4
