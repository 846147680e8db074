//! Fire-and-forget alert dispatch.
//!
//! Delivery runs on a spawned task; failures are logged and never reach the
//! caller.

use async_trait::async_trait;
use std::sync::Arc;

use warden_types::notify_adapter::{Notification, NotifyAdapter};

use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct Notifier {
	adapter: Option<Arc<dyn NotifyAdapter>>,
}

impl Notifier {
	pub fn new(adapter: Arc<dyn NotifyAdapter>) -> Self {
		Self { adapter: Some(adapter) }
	}

	/// Notifier that drops every alert
	pub fn disabled() -> Self {
		Self { adapter: None }
	}

	pub fn dispatch(&self, notification: Notification) {
		let Some(adapter) = self.adapter.clone() else {
			return;
		};

		let Ok(handle) = tokio::runtime::Handle::try_current() else {
			warn!(title = %notification.title, "No async runtime, notification dropped");
			return;
		};

		handle.spawn(async move {
			if let Err(err) = adapter.send(&notification).await {
				warn!(title = %notification.title, error = %err, "Failed to deliver notification");
			}
		});
	}
}

/// Adapter that writes alerts to the log, used when no delivery channel is configured
#[derive(Debug, Default)]
pub struct LogNotifyAdapter;

#[async_trait]
impl NotifyAdapter for LogNotifyAdapter {
	async fn send(&self, notification: &Notification) -> WdResult<()> {
		let fields = notification
			.fields
			.iter()
			.map(|f| format!("{}={}", f.name, f.value))
			.collect::<Vec<_>>()
			.join(", ");
		info!(
			severity = ?notification.severity,
			fields = %fields,
			"[notify] {}: {}",
			notification.title,
			notification.message
		);
		Ok(())
	}
}


// vim: ts=4
