//! Outbound transports and their detection.
//!
//! Exactly one transport is chosen when the bridge is built, by probing the
//! host in a fixed priority order:
//!
//! 1. native webview proxy (`postEvent(type, data)`)
//! 2. `external.notify(json)`
//! 3. parent frame `postMessage(json, origin)`
//!
//! If none is present the page cannot talk to its host at all, and
//! detection fails with [`Error::TransportUndetectable`].

use std::fmt;
use std::sync::Arc;

use miniapp_protocol::Envelope;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::host::{ExternalNotifier, HostEnvironment, ParentFrame, WebViewProxy};
use crate::options::BridgeOptions;


/// Which host mechanism carries outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
	NativeProxyPostEvent,
	ExternalNotify,
	ParentWindowPostMessage,
}

impl fmt::Display for TransportKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::NativeProxyPostEvent => "window.TelegramWebviewProxy.postEvent",
			Self::ExternalNotify => "window.external.notify",
			Self::ParentWindowPostMessage => "window.parent.postMessage",
		})
	}
}

/// A fire-and-forget outbound channel to the host.
pub trait Transport: Send + Sync {
	fn kind(&self) -> TransportKind;

	/// Delivers one envelope using this transport's call convention.
	fn send(&self, envelope: &Envelope) -> Result<()>;
}

/// Calls `postEvent(eventType, JSON(eventData))` on the native proxy.
pub struct WebViewProxyTransport {
	proxy: Arc<dyn WebViewProxy>,
}

impl WebViewProxyTransport {
	pub fn new(proxy: Arc<dyn WebViewProxy>) -> Self {
		Self { proxy }
	}
}

impl Transport for WebViewProxyTransport {
	fn kind(&self) -> TransportKind {
		TransportKind::NativeProxyPostEvent
	}

	fn send(&self, envelope: &Envelope) -> Result<()> {
		let data = envelope.data_json()?;
		self.proxy.post_event(&envelope.event_type, &data)
	}
}

/// Calls `external.notify(JSON(envelope))`.
pub struct ExternalNotifyTransport {
	notifier: Arc<dyn ExternalNotifier>,
}

impl ExternalNotifyTransport {
	pub fn new(notifier: Arc<dyn ExternalNotifier>) -> Self {
		Self { notifier }
	}
}

impl Transport for ExternalNotifyTransport {
	fn kind(&self) -> TransportKind {
		TransportKind::ExternalNotify
	}

	fn send(&self, envelope: &Envelope) -> Result<()> {
		self.notifier.notify(&envelope.to_json()?)
	}
}

/// Calls `parent.postMessage(JSON(envelope), target_origin)`.
pub struct ParentFrameTransport {
	frame: Arc<dyn ParentFrame>,
	target_origin: String,
}

impl ParentFrameTransport {
	pub fn new(frame: Arc<dyn ParentFrame>, target_origin: impl Into<String>) -> Self {
		Self {
			frame,
			target_origin: target_origin.into(),
		}
	}

	pub fn target_origin(&self) -> &str {
		&self.target_origin
	}
}

impl Transport for ParentFrameTransport {
	fn kind(&self) -> TransportKind {
		TransportKind::ParentWindowPostMessage
	}

	fn send(&self, envelope: &Envelope) -> Result<()> {
		self.frame.post_message(&envelope.to_json()?, &self.target_origin)
	}
}

/// Selects the transport for this page, first match wins.
pub fn detect_transport(host: &dyn HostEnvironment, options: &BridgeOptions) -> Result<Box<dyn Transport>> {
	if let Some(proxy) = host.webview_proxy() {
		return Ok(Box::new(WebViewProxyTransport::new(proxy)));
	}

	if let Some(notifier) = host.external_notifier() {
		return Ok(Box::new(ExternalNotifyTransport::new(notifier)));
	}

	if let Some(frame) = host.parent_frame() {
		return Ok(Box::new(ParentFrameTransport::new(
			frame,
			options.trusted_target_origin.clone(),
		)));
	}

	Err(Error::TransportUndetectable)
}
