//! Host capability interface.
//!
//! A Mini App page talks to its host through whatever globals the host
//! injects: a native webview proxy, `window.external.notify`, or the parent
//! frame's `postMessage`. These traits stand in for those globals so the
//! bridge never touches ambient state directly. The browser adapter
//! implements them over `window`; tests use an in-memory host.

use std::fmt;
use std::sync::Arc;

use crate::bridge::EventReceiver;
use crate::error::Result;

/// Callback invoked for every cross-frame `message` event.
pub type FrameMessageListener = Arc<dyn Fn(FrameMessage) + Send + Sync>;

/// Probes for the capabilities a host may expose.
pub trait HostEnvironment: Send + Sync {
	/// Native proxy object exposing `postEvent(type, data)`.
	fn webview_proxy(&self) -> Option<Arc<dyn WebViewProxy>>;

	/// `external` object exposing `notify(json)`.
	fn external_notifier(&self) -> Option<Arc<dyn ExternalNotifier>>;

	/// Present iff the page runs embedded inside another frame.
	fn parent_frame(&self) -> Option<Arc<dyn ParentFrame>>;

	/// Exposes the bridge's inbound entry point under a legacy global name.
	///
	/// Hosts without global callback slots keep the default no-op.
	fn install_receiver(&self, slot: ReceiverSlot, receiver: EventReceiver) -> Result<()> {
		let _ = (slot, receiver);
		Ok(())
	}
}

/// Native webview proxy (`window.TelegramWebviewProxy`).
pub trait WebViewProxy: Send + Sync {
	/// Delivers one event; `event_data` is the JSON-encoded payload.
	fn post_event(&self, event_type: &str, event_data: &str) -> Result<()>;
}

/// `window.external.notify`.
pub trait ExternalNotifier: Send + Sync {
	/// Delivers one JSON-encoded envelope.
	fn notify(&self, message: &str) -> Result<()>;
}

/// The page's view of being embedded in a frame: messaging with
/// `window.parent` plus the page-level operations the iframe protocol needs.
pub trait ParentFrame: Send + Sync {
	/// `window.parent.postMessage(message, target_origin)`.
	fn post_message(&self, message: &str, target_origin: &str) -> Result<()>;

	/// Subscribes to the page's inbound `message` events.
	fn add_message_listener(&self, listener: FrameMessageListener) -> Result<()>;

	/// Creates a `<style>` element and appends it to the document head.
	fn create_style_element(&self) -> Result<Box<dyn StyleElement>>;

	/// Reloads the page. The current bridge does not survive this.
	fn reload(&self);
}

/// A `<style>` element owned by the bridge.
pub trait StyleElement: Send + Sync {
	/// Replaces the element's content.
	fn set_content(&self, css: &str);
}

/// Where a cross-frame message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
	/// The immediate parent frame.
	Parent,
	/// Anything else: nested frames, unrelated windows.
	Other,
}

/// A cross-frame `message` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameMessage {
	pub source: MessageSource,
	/// Origin asserted by the sender.
	pub origin: String,
	/// Raw message data, expected to be a JSON envelope.
	pub data: String,
}

impl FrameMessage {
	/// A message from the parent frame.
	pub fn from_parent(origin: impl Into<String>, data: impl Into<String>) -> Self {
		Self {
			source: MessageSource::Parent,
			origin: origin.into(),
			data: data.into(),
		}
	}
}

/// Global callback names older host clients call to deliver events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiverSlot {
	/// `window.TelegramGameProxy_receiveEvent`
	GameProxyFunction,
	/// `window.TelegramGameProxy.receiveEvent`
	GameProxyObject,
	/// `window.Telegram.WebView.receiveEvent`
	WebView,
}

impl ReceiverSlot {
	pub const ALL: [ReceiverSlot; 3] = [Self::GameProxyFunction, Self::GameProxyObject, Self::WebView];

	/// Dotted global path of the slot, relative to `window`.
	pub fn global_path(&self) -> &'static str {
		match self {
			Self::GameProxyFunction => "TelegramGameProxy_receiveEvent",
			Self::GameProxyObject => "TelegramGameProxy.receiveEvent",
			Self::WebView => "Telegram.WebView.receiveEvent",
		}
	}
}

impl fmt::Display for ReceiverSlot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.global_path())
	}
}
