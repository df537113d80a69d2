//! The `{eventType, eventData}` envelope shared by every transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Decoding failure for an inbound envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
	/// The text is not valid JSON.
	#[error("malformed envelope: {0}")]
	Malformed(#[from] serde_json::Error),

	/// The JSON value is not an object with a non-empty string `eventType`.
	#[error("envelope has no eventType")]
	MissingEventType,
}

/// A single protocol message.
///
/// `event_data` is never absent on the wire: a missing payload is encoded
/// as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
	/// Event name, e.g. `"web_app_ready"` or `"main_button_pressed"`.
	#[serde(rename = "eventType")]
	pub event_type: String,
	/// Event payload.
	#[serde(rename = "eventData", default)]
	pub event_data: Value,
}

impl Envelope {
	/// Builds an envelope, normalizing a missing payload to `null`.
	pub fn new(event_type: impl Into<String>, event_data: Option<Value>) -> Self {
		Self {
			event_type: event_type.into(),
			event_data: event_data.unwrap_or(Value::Null),
		}
	}

	/// Encodes the envelope as JSON text.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	/// Encodes only the payload as JSON text (`"null"` when there is none).
	pub fn data_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(&self.event_data)
	}

	/// Decodes an envelope from JSON text.
	///
	/// Accepts any object whose `eventType` is a non-empty string; a missing
	/// `eventData` decodes as `null`.
	pub fn from_json(raw: &str) -> Result<Self, EnvelopeError> {
		let value: Value = serde_json::from_str(raw)?;
		Self::from_value(value)
	}

	/// Decodes an envelope from an already-parsed JSON value.
	pub fn from_value(mut value: Value) -> Result<Self, EnvelopeError> {
		let event_type = value
			.get("eventType")
			.and_then(Value::as_str)
			.filter(|name| !name.is_empty())
			.ok_or(EnvelopeError::MissingEventType)?
			.to_string();

		let event_data = value
			.get_mut("eventData")
			.map(Value::take)
			.unwrap_or(Value::Null);

		Ok(Self {
			event_type,
			event_data,
		})
	}
}
