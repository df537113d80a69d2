//! Lifecycle of a page embedded in a parent frame.
//!
//! The parent talks to the page with `message` events carrying JSON
//! envelopes. Two of them are handled here rather than dispatched:
//! `set_custom_style`, honoured only from [`TRUSTED_STYLE_ORIGIN`], and
//! `reload_iframe`.

use std::sync::{Arc, Weak};

use miniapp_protocol::{Envelope, IframeReadyParams, IncomingEvent, OutgoingEvent};
use serde_json::Value;

use super::Inner;
use crate::error::Result;
use crate::host::{FrameMessage, MessageSource, ParentFrame};
use crate::options::TRUSTED_STYLE_ORIGIN;
use crate::transport::{ParentFrameTransport, Transport};

/// Subscribes to parent messages and announces readiness.
///
/// Failures are logged; the bridge keeps working without the iframe protocol.
pub(super) fn setup(inner: &Arc<Inner>, frame: Arc<dyn ParentFrame>) {
	if let Err(err) = try_setup(inner, frame) {
		tracing::warn!(%err, "iframe setup failed");
	}
}

fn try_setup(inner: &Arc<Inner>, frame: Arc<dyn ParentFrame>) -> Result<()> {
	let weak = Arc::downgrade(inner);
	frame.add_message_listener(Arc::new(move |message| handle_message(&weak, message)))?;

	let parent = ParentFrameTransport::new(frame, inner.options.trusted_target_origin.clone());
	let ready = OutgoingEvent::IframeReady(IframeReadyParams { reload_supported: true });
	parent.send(&ready.to_envelope()?)
}

fn handle_message(inner: &Weak<Inner>, message: FrameMessage) {
	if message.source != MessageSource::Parent {
		return;
	}
	let Some(inner) = inner.upgrade() else {
		return;
	};

	let envelope = match Envelope::from_json(&message.data) {
		Ok(envelope) => envelope,
		Err(err) => {
			tracing::debug!(%err, "ignoring parent message");
			return;
		}
	};

	match envelope.event_type.parse::<IncomingEvent>() {
		Ok(IncomingEvent::SetCustomStyle) => {
			if message.origin == TRUSTED_STYLE_ORIGIN {
				apply_custom_style(&inner, &envelope.event_data);
			} else {
				tracing::debug!(origin = %message.origin, "ignoring custom style from untrusted origin");
			}
		}
		Ok(IncomingEvent::ReloadIframe) => reload(&inner),
		_ => inner.receive(&envelope.event_type, envelope.event_data),
	}
}

fn apply_custom_style(inner: &Inner, data: &Value) {
	let Some(frame) = inner.frame.as_ref() else {
		return;
	};
	let css = match data {
		Value::String(css) => css.clone(),
		Value::Null => String::new(),
		other => other.to_string(),
	};

	let mut style = inner.style.lock();
	if style.is_none() {
		match frame.create_style_element() {
			Ok(element) => *style = Some(element),
			Err(err) => {
				tracing::warn!(%err, "failed to create style element");
				return;
			}
		}
	}
	if let Some(element) = style.as_ref() {
		element.set_content(&css);
	}
}

/// Tells the parent the page is about to reload, then reloads.
///
/// The notice always goes to the parent frame, whatever transport the
/// bridge detected for ordinary traffic.
fn reload(inner: &Inner) {
	let Some(frame) = inner.frame.as_ref() else {
		return;
	};

	let parent = ParentFrameTransport::new(Arc::clone(frame), inner.options.trusted_target_origin.clone());
	match OutgoingEvent::IframeWillReload.to_envelope() {
		Ok(envelope) => {
			tracing::debug!(event = %envelope.event_type, "notifying parent before reload");
			if let Err(err) = parent.send(&envelope) {
				tracing::warn!(%err, "failed to announce reload");
			}
		}
		Err(err) => tracing::warn!(%err, "failed to encode reload notice"),
	}

	frame.reload();
}
