//! Webhook notification adapter
//!
//! Posts alerts as a single embed (`{"embeds": [...]}`), the payload format
//! understood by Discord and compatible chat webhooks.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http_body_util::Full;
use hyper::Uri;
use hyper::body::Bytes;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use rustls::crypto::{CryptoProvider, aws_lc_rs};
use serde_json::json;

use warden_types::notify_adapter::{Notification, NotifyAdapter};
use warden_types::prelude::*;

// Embed limits enforced by the receiving side
const MAX_TITLE_LEN: usize = 256;
const MAX_DESCRIPTION_LEN: usize = 4096;
const MAX_FIELD_NAME_LEN: usize = 256;
const MAX_FIELD_VALUE_LEN: usize = 1024;
const MAX_FIELDS: usize = 25;

fn truncate(s: &str, max_chars: usize) -> String {
	match s.char_indices().nth(max_chars) {
		Some((idx, _)) => s[..idx].to_string(),
		None => s.to_string(),
	}
}

/// Build the JSON body posted for a notification
pub fn webhook_payload(notification: &Notification) -> serde_json::Value {
	let fields: Vec<_> = notification
		.fields
		.iter()
		.take(MAX_FIELDS)
		.map(|field| {
			// Empty values are rejected by the receiver
			let value = if field.value.is_empty() { "-" } else { field.value.as_ref() };
			json!({
				"name": truncate(&field.name, MAX_FIELD_NAME_LEN),
				"value": truncate(value, MAX_FIELD_VALUE_LEN),
				"inline": field.inline,
			})
		})
		.collect();

	json!({
		"embeds": [{
			"title": truncate(&notification.title, MAX_TITLE_LEN),
			"description": truncate(&notification.message, MAX_DESCRIPTION_LEN),
			"color": notification.severity.color(),
			"fields": fields,
			"timestamp": notification.timestamp.to_iso_string(),
		}]
	})
}

pub struct NotifyAdapterWebhook {
	url: Uri,
	timeout: Duration,
	client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl NotifyAdapterWebhook {
	pub fn new(url: &str, timeout: Duration) -> WdResult<Self> {
		let url: Uri = url
			.parse()
			.map_err(|err| Error::ConfigError(format!("invalid webhook url: {}", err)))?;
		if !matches!(url.scheme_str(), Some("https" | "http")) || url.host().is_none() {
			return Err(Error::ConfigError("webhook url must be an absolute http(s) url".into()));
		}

		let provider = CryptoProvider::get_default()
			.cloned()
			.unwrap_or_else(|| Arc::new(aws_lc_rs::default_provider()));
		let connector = HttpsConnectorBuilder::new()
			.with_provider_and_native_roots(provider)
			.map_err(|err| Error::ConfigError(format!("TLS error: {}", err)))?
			.https_or_http()
			.enable_http1()
			.enable_http2()
			.build();
		let client = Client::builder(TokioExecutor::new()).build(connector);

		Ok(Self { url, timeout, client })
	}
}

impl std::fmt::Debug for NotifyAdapterWebhook {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		// The url path carries the webhook secret
		f.debug_struct("NotifyAdapterWebhook")
			.field("host", &self.url.host())
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}

#[async_trait]
impl NotifyAdapter for NotifyAdapterWebhook {
	async fn send(&self, notification: &Notification) -> WdResult<()> {
		let body = serde_json::to_vec(&webhook_payload(notification))?;
		let request = hyper::Request::builder()
			.method(hyper::Method::POST)
			.uri(self.url.clone())
			.header("Content-Type", "application/json")
			.body(Full::new(Bytes::from(body)))
			.map_err(|err| Error::Internal(format!("request build error: {}", err)))?;

		let response = tokio::time::timeout(self.timeout, self.client.request(request))
			.await
			.map_err(|_| Error::Timeout)?
			.map_err(|err| Error::NetworkError(format!("webhook request failed: {}", err)))?;

		let status = response.status();
		if !status.is_success() {
			return Err(Error::NetworkError(format!("webhook returned HTTP {}", status)));
		}
		debug!(title = %notification.title, "Notification delivered");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use warden_types::notify_adapter::Severity;
	use warden_types::types::Timestamp;

	#[test]
	fn test_payload_shape() {
		let mut notification =
			Notification::new("IP Address Blocked", "10.0.0.1 has been blocked", Severity::Warning)
				.field("Address", "10.0.0.1")
				.wide_field("Reason", "");
		notification.timestamp = Timestamp(1_700_000_000);

		let payload = webhook_payload(&notification);
		let embed = &payload["embeds"][0];
		assert_eq!(embed["title"], "IP Address Blocked");
		assert_eq!(embed["description"], "10.0.0.1 has been blocked");
		assert_eq!(embed["color"], 0x00f3_9c12);
		assert_eq!(embed["timestamp"], "2023-11-14T22:13:20Z");
		assert_eq!(embed["fields"][0]["name"], "Address");
		assert_eq!(embed["fields"][0]["inline"], true);
		assert_eq!(embed["fields"][1]["value"], "-");
		assert_eq!(embed["fields"][1]["inline"], false);
	}

	#[test]
	fn test_long_values_are_truncated() {
		let long = "x".repeat(2000);
		let notification = Notification::new("t", "m", Severity::Info).field("f", long.as_str());
		let payload = webhook_payload(&notification);
		assert_eq!(payload["embeds"][0]["fields"][0]["value"].as_str().unwrap().len(), 1024);
	}

	#[test]
	fn test_rejects_invalid_url() {
		let timeout = Duration::from_secs(5);
		assert!(matches!(
			NotifyAdapterWebhook::new("not a url", timeout),
			Err(Error::ConfigError(_))
		));
		assert!(matches!(
			NotifyAdapterWebhook::new("ftp://example.com/hook", timeout),
			Err(Error::ConfigError(_))
		));
	}
}

// vim: ts=4
