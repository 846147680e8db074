//! Adapter that delivers operator alerts (block, unblock, violations).

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Info,
	Success,
	Warning,
	Critical,
}

impl Severity {
	/// RGB color used by chat-style alert sinks
	pub fn color(&self) -> u32 {
		match self {
			Severity::Info => 0x0034_98db,
			Severity::Success => 0x002e_cc71,
			Severity::Warning => 0x00f3_9c12,
			Severity::Critical => 0x00e7_4c3c,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationField {
	pub name: Box<str>,
	pub value: Box<str>,
	pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
	pub title: Box<str>,
	pub message: Box<str>,
	pub severity: Severity,
	pub fields: Vec<NotificationField>,
	pub timestamp: Timestamp,
}

impl Notification {
	pub fn new(title: impl Into<Box<str>>, message: impl Into<Box<str>>, severity: Severity) -> Self {
		Self {
			title: title.into(),
			message: message.into(),
			severity,
			fields: Vec::new(),
			timestamp: crate::types::now(),
		}
	}

	pub fn field(mut self, name: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
		self.fields.push(NotificationField { name: name.into(), value: value.into(), inline: true });
		self
	}

	/// Full-width field, for long values such as reasons
	pub fn wide_field(mut self, name: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
		self.fields.push(NotificationField {
			name: name.into(),
			value: value.into(),
			inline: false,
		});
		self
	}
}

#[async_trait]
pub trait NotifyAdapter: Debug + Send + Sync {
	async fn send(&self, notification: &Notification) -> WdResult<()>;
}

// vim: ts=4
