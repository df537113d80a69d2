//! The bridge between a Mini App page and its host.
//!
//! A [`Bridge`] owns the transport chosen at construction, the listener
//! registry for incoming events, and the table of outstanding custom-method
//! requests. Inbound traffic reaches it through [`Bridge::receive_event`]
//! (or an [`EventReceiver`] handed to the host), and, when the page is
//! embedded, through the parent frame's `message` events.

use std::sync::{Arc, Weak};

use miniapp_protocol::{
	CustomMethodInvoked, Envelope, IncomingEvent, InvokeCustomMethodParams, OutgoingEvent,
};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::host::{HostEnvironment, ParentFrame, ReceiverSlot, StyleElement};
use crate::options::BridgeOptions;
use crate::registry::{Listener, ListenerRegistry, SharedRegistry, Subscription, invoke_isolated, listener};
use crate::transport::{Transport, TransportKind, detect_transport};

mod iframe;
mod pending;

pub use pending::{
	MAX_REQUEST_ID_ATTEMPTS, PendingCall, REQUEST_ID_ALPHABET, REQUEST_ID_LENGTH, RandomRequestIds,
	RequestIdGenerator,
};
use pending::PendingRequests;

#[cfg(test)]
mod tests;

struct Inner {
	transport: Box<dyn Transport>,
	listeners: SharedRegistry,
	pending: PendingRequests,
	request_ids: Box<dyn RequestIdGenerator>,
	frame: Option<Arc<dyn ParentFrame>>,
	style: Mutex<Option<Box<dyn StyleElement>>>,
	options: BridgeOptions,
}

/// Handle to the page's host connection.
///
/// Cloning is cheap; all clones share the same transport, listeners, and
/// pending requests.
#[derive(Clone)]
pub struct Bridge {
	inner: Arc<Inner>,
}

impl Bridge {
	/// Detects the transport and wires up inbound delivery.
	///
	/// Fails only if the host exposes no way to send messages.
	pub fn new(host: &dyn HostEnvironment, options: BridgeOptions) -> Result<Self> {
		Self::with_request_ids(host, options, Box::new(RandomRequestIds))
	}

	/// Like [`Bridge::new`], drawing request ids from `request_ids`.
	pub fn with_request_ids(
		host: &dyn HostEnvironment,
		options: BridgeOptions,
		request_ids: Box<dyn RequestIdGenerator>,
	) -> Result<Self> {
		let transport = detect_transport(host, &options)?;
		tracing::debug!(transport = %transport.kind(), "detected host transport");

		let bridge = Self {
			inner: Arc::new(Inner {
				transport,
				listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
				pending: PendingRequests::default(),
				request_ids,
				frame: host.parent_frame(),
				style: Mutex::new(None),
				options,
			}),
		};

		if let Some(frame) = bridge.inner.frame.clone() {
			iframe::setup(&bridge.inner, frame);
		}

		if bridge.inner.options.legacy_receivers {
			for slot in ReceiverSlot::ALL {
				if let Err(err) = host.install_receiver(slot, bridge.receiver()) {
					tracing::warn!(%slot, %err, "failed to install legacy receiver");
				}
			}
		}

		Ok(bridge)
	}

	pub fn transport_kind(&self) -> TransportKind {
		self.inner.transport.kind()
	}

	pub fn options(&self) -> &BridgeOptions {
		&self.inner.options
	}

	/// Sends one event to the host.
	pub fn post_event(&self, event: &OutgoingEvent) -> Result<()> {
		self.inner.post(&event.to_envelope()?)
	}

	/// Dispatches one inbound event.
	///
	/// Unknown event names are dropped. Replies to custom methods settle
	/// their pending request before ordinary listeners run.
	pub fn receive_event(&self, event_type: &str, event_data: Value) {
		self.inner.receive(event_type, event_data);
	}

	/// Inbound entry point that does not keep the bridge alive.
	pub fn receiver(&self) -> EventReceiver {
		EventReceiver {
			inner: Arc::downgrade(&self.inner),
		}
	}

	/// Registers `f` for `event`. The listener stays until the returned
	/// [`Subscription`] is dropped or detached.
	pub fn on_event<F>(&self, event: IncomingEvent, f: F) -> Subscription
	where
		F: Fn(&Value) + Send + Sync + 'static,
	{
		self.subscribe(event, listener(f))
	}

	/// Registers a listener that receives `eventData` decoded as `T`.
	///
	/// Payloads that fail to decode are logged and skipped.
	pub fn on_event_typed<T, F>(&self, event: IncomingEvent, f: F) -> Subscription
	where
		T: DeserializeOwned,
		F: Fn(T) + Send + Sync + 'static,
	{
		self.on_event(event, move |data| match serde_json::from_value::<T>(data.clone()) {
			Ok(payload) => f(payload),
			Err(err) => tracing::warn!(%event, %err, "dropping undecodable event payload"),
		})
	}

	/// Registers an existing listener. Returns its [`Subscription`].
	pub fn subscribe(&self, event: IncomingEvent, listener: Listener) -> Subscription {
		let id = self.inner.listeners.lock().insert(event, listener);
		Subscription::new(event, id, &self.inner.listeners)
	}

	/// Adds `listener` unless that same `Arc` is already registered for `event`.
	pub fn add_event_listener(&self, event: IncomingEvent, listener: &Listener) -> bool {
		self.inner.listeners.lock().insert_unique(event, listener)
	}

	/// Removes `listener` from `event`. Absent listeners are ignored.
	pub fn remove_event_listener(&self, event: IncomingEvent, listener: &Listener) -> bool {
		self.inner.listeners.lock().remove_listener(event, listener)
	}

	pub fn listener_count(&self, event: IncomingEvent) -> usize {
		self.inner.listeners.lock().len(event)
	}

	/// Calls a host-side custom method.
	///
	/// The request is sent before this returns; await the [`PendingCall`]
	/// for the reply. Dropping it forgets the request.
	pub fn invoke_custom_method<P: Serialize>(&self, method: &str, params: P) -> Result<PendingCall> {
		if method.is_empty() {
			return Err(Error::InvalidArgument("custom method name is empty".to_string()));
		}
		let params = serde_json::to_value(params)?;
		let call = self.inner.pending.allocate(method, self.inner.request_ids.as_ref())?;

		tracing::debug!(req_id = call.req_id(), method, "invoking custom method");
		let event = OutgoingEvent::InvokeCustomMethod(InvokeCustomMethodParams {
			req_id: call.req_id().to_string(),
			method: method.to_string(),
			params,
		});
		// On failure the call is dropped here, which removes its pending entry.
		self.post_event(&event)?;
		Ok(call)
	}

	/// Number of custom-method calls still awaiting a reply.
	pub fn pending_requests(&self) -> usize {
		self.inner.pending.len()
	}
}

impl std::fmt::Debug for Bridge {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Bridge")
			.field("transport", &self.transport_kind())
			.field("pending_requests", &self.pending_requests())
			.finish()
	}
}

impl Inner {
	fn post(&self, envelope: &Envelope) -> Result<()> {
		tracing::debug!(event = %envelope.event_type, data = %envelope.event_data, "posting event");
		self.transport.send(envelope)
	}

	fn receive(&self, event_type: &str, event_data: Value) {
		let event = match event_type.parse::<IncomingEvent>() {
			Ok(event) => event,
			Err(err) => {
				tracing::debug!(%err, "dropping inbound event");
				return;
			}
		};
		tracing::debug!(%event, data = %event_data, "received event");

		if event == IncomingEvent::CustomMethodInvoked {
			match serde_json::from_value::<CustomMethodInvoked>(event_data.clone()) {
				Ok(reply) => self.pending.resolve(reply),
				Err(err) => tracing::warn!(%err, "malformed custom method reply"),
			}
		}

		let listeners = self.listeners.lock().snapshot(event);
		for listener in &listeners {
			invoke_isolated(event, listener, &event_data);
		}
	}
}

/// Weak handle to a bridge's inbound dispatch.
///
/// This is what the host calls to deliver events. Once the bridge is
/// dropped, deliveries are ignored.
#[derive(Clone)]
pub struct EventReceiver {
	inner: Weak<Inner>,
}

impl EventReceiver {
	/// Same as [`Bridge::receive_event`].
	pub fn receive(&self, event_type: &str, event_data: Value) {
		match self.inner.upgrade() {
			Some(inner) => inner.receive(event_type, event_data),
			None => tracing::debug!(event_type, "bridge dropped, ignoring event"),
		}
	}

	pub fn receive_envelope(&self, envelope: Envelope) {
		self.receive(&envelope.event_type, envelope.event_data);
	}

	pub fn is_alive(&self) -> bool {
		self.inner.strong_count() > 0
	}
}

impl std::fmt::Debug for EventReceiver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EventReceiver").field("alive", &self.is_alive()).finish()
	}
}
