//! In-memory host for tests and the simulator.
//!
//! [`MockHost`] implements every host capability over shared state, records
//! each call the bridge makes, and lets the caller play the host's side:
//! delivering frame messages, invoking installed receivers, or answering
//! outbound events from a hook.

use std::collections::HashMap;
use std::sync::Arc;

use miniapp_protocol::Envelope;
use parking_lot::Mutex;

use crate::bridge::EventReceiver;
use crate::error::{Error, Result};
use crate::host::{
	ExternalNotifier, FrameMessage, FrameMessageListener, HostEnvironment, ParentFrame, ReceiverSlot,
	StyleElement, WebViewProxy,
};

/// A single call made against the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
	PostEvent { event_type: String, event_data: String },
	Notify { message: String },
	PostMessage { message: String, target_origin: String },
	StyleCreated,
	StyleContent(String),
	Reload,
}

impl HostCall {
	/// Decodes the envelope carried by an outbound call.
	pub fn envelope(&self) -> Option<Envelope> {
		match self {
			HostCall::PostEvent {
				event_type,
				event_data,
			} => Some(Envelope::new(event_type.clone(), serde_json::from_str(event_data).ok())),
			HostCall::Notify { message } | HostCall::PostMessage { message, .. } => Envelope::from_json(message).ok(),
			_ => None,
		}
	}
}

/// Callback run for every envelope the page sends.
pub type OutboundHook = Arc<dyn Fn(&Envelope) + Send + Sync>;

#[derive(Default)]
struct MockState {
	calls: Vec<HostCall>,
	frame_listeners: Vec<FrameMessageListener>,
	receivers: HashMap<ReceiverSlot, EventReceiver>,
	fail_sends: bool,
	fail_frame_setup: bool,
	hook: Option<OutboundHook>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Capabilities {
	native: bool,
	external: bool,
	frame: bool,
}

/// Scriptable host exposing any combination of capabilities.
#[derive(Clone, Default)]
pub struct MockHost {
	caps: Capabilities,
	state: Arc<Mutex<MockState>>,
}

impl MockHost {
	/// A host with no capabilities at all.
	pub fn bare() -> Self {
		Self::default()
	}

	pub fn native() -> Self {
		Self::bare().with_native_proxy()
	}

	pub fn external() -> Self {
		Self::bare().with_external_notifier()
	}

	pub fn iframe() -> Self {
		Self::bare().with_parent_frame()
	}

	pub fn with_native_proxy(mut self) -> Self {
		self.caps.native = true;
		self
	}

	pub fn with_external_notifier(mut self) -> Self {
		self.caps.external = true;
		self
	}

	pub fn with_parent_frame(mut self) -> Self {
		self.caps.frame = true;
		self
	}

	/// Makes every outbound host call fail.
	pub fn fail_sends(&self, fail: bool) {
		self.state.lock().fail_sends = fail;
	}

	/// Makes `add_message_listener` fail.
	pub fn fail_frame_setup(&self, fail: bool) {
		self.state.lock().fail_frame_setup = fail;
	}

	/// Runs `hook` for every envelope the page sends, after it is recorded.
	pub fn on_outbound<F>(&self, hook: F)
	where
		F: Fn(&Envelope) + Send + Sync + 'static,
	{
		self.state.lock().hook = Some(Arc::new(hook));
	}

	/// Drops the outbound hook, releasing whatever it captured.
	pub fn clear_outbound_hook(&self) {
		self.state.lock().hook = None;
	}

	pub fn calls(&self) -> Vec<HostCall> {
		self.state.lock().calls.clone()
	}

	/// Every envelope sent so far, in order, whatever the transport.
	pub fn outbound(&self) -> Vec<Envelope> {
		self.state.lock().calls.iter().filter_map(HostCall::envelope).collect()
	}

	/// Outbound envelopes with the given event name.
	pub fn outbound_named(&self, event_type: &str) -> Vec<Envelope> {
		self.outbound()
			.into_iter()
			.filter(|envelope| envelope.event_type == event_type)
			.collect()
	}

	pub fn clear(&self) {
		self.state.lock().calls.clear();
	}

	/// Delivers a `message` event to every registered frame listener.
	pub fn deliver_frame_message(&self, message: FrameMessage) {
		let listeners = self.state.lock().frame_listeners.clone();
		for listener in listeners {
			listener(message.clone());
		}
	}

	/// Receiver installed under a legacy slot, if any.
	pub fn receiver(&self, slot: ReceiverSlot) -> Option<EventReceiver> {
		self.state.lock().receivers.get(&slot).cloned()
	}

	pub fn frame_listener_count(&self) -> usize {
		self.state.lock().frame_listeners.len()
	}

	/// Current content of the style element, if one was created.
	pub fn style_content(&self) -> Option<String> {
		self.state.lock().calls.iter().rev().find_map(|call| match call {
			HostCall::StyleContent(css) => Some(css.clone()),
			_ => None,
		})
	}

	pub fn style_elements_created(&self) -> usize {
		self.count(|call| matches!(call, HostCall::StyleCreated))
	}

	pub fn reloads(&self) -> usize {
		self.count(|call| matches!(call, HostCall::Reload))
	}

	fn count(&self, predicate: impl Fn(&HostCall) -> bool) -> usize {
		self.state.lock().calls.iter().filter(|call| predicate(call)).count()
	}

	fn send(&self, call: HostCall) -> Result<()> {
		let hook = {
			let mut state = self.state.lock();
			if state.fail_sends {
				return Err(Error::Host("mock host rejected the call".to_string()));
			}
			state.calls.push(call.clone());
			state.hook.clone()
		};

		if let (Some(hook), Some(envelope)) = (hook, call.envelope()) {
			hook(&envelope);
		}
		Ok(())
	}

	fn record(&self, call: HostCall) {
		self.state.lock().calls.push(call);
	}
}

impl HostEnvironment for MockHost {
	fn webview_proxy(&self) -> Option<Arc<dyn WebViewProxy>> {
		self.caps.native.then(|| Arc::new(self.clone()) as Arc<dyn WebViewProxy>)
	}

	fn external_notifier(&self) -> Option<Arc<dyn ExternalNotifier>> {
		self.caps.external.then(|| Arc::new(self.clone()) as Arc<dyn ExternalNotifier>)
	}

	fn parent_frame(&self) -> Option<Arc<dyn ParentFrame>> {
		self.caps.frame.then(|| Arc::new(self.clone()) as Arc<dyn ParentFrame>)
	}

	fn install_receiver(&self, slot: ReceiverSlot, receiver: EventReceiver) -> Result<()> {
		self.state.lock().receivers.insert(slot, receiver);
		Ok(())
	}
}

impl WebViewProxy for MockHost {
	fn post_event(&self, event_type: &str, event_data: &str) -> Result<()> {
		self.send(HostCall::PostEvent {
			event_type: event_type.to_string(),
			event_data: event_data.to_string(),
		})
	}
}

impl ExternalNotifier for MockHost {
	fn notify(&self, message: &str) -> Result<()> {
		self.send(HostCall::Notify {
			message: message.to_string(),
		})
	}
}

impl ParentFrame for MockHost {
	fn post_message(&self, message: &str, target_origin: &str) -> Result<()> {
		self.send(HostCall::PostMessage {
			message: message.to_string(),
			target_origin: target_origin.to_string(),
		})
	}

	fn add_message_listener(&self, listener: FrameMessageListener) -> Result<()> {
		let mut state = self.state.lock();
		if state.fail_frame_setup {
			return Err(Error::Host("addEventListener is not available".to_string()));
		}
		state.frame_listeners.push(listener);
		Ok(())
	}

	fn create_style_element(&self) -> Result<Box<dyn StyleElement>> {
		self.record(HostCall::StyleCreated);
		Ok(Box::new(MockStyle {
			state: Arc::clone(&self.state),
		}))
	}

	fn reload(&self) {
		self.record(HostCall::Reload);
	}
}

struct MockStyle {
	state: Arc<Mutex<MockState>>,
}

impl StyleElement for MockStyle {
	fn set_content(&self, css: &str) {
		self.state.lock().calls.push(HostCall::StyleContent(css.to_string()));
	}
}
