//! Error types for the Mini App bridge.

use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can surface from the bridge.
///
/// Only construction failures and caller-meaningful failures are represented
/// here. Malformed inbound messages, panicking listeners, and iframe setup
/// failures are logged and dropped where they occur.
#[derive(Debug, Error)]
pub enum Error {
	/// None of the host capabilities was found. Fatal for the page lifetime.
	#[error("Failed to detect Mini App communication method")]
	TransportUndetectable,

	/// Every generated request id collided with a pending request.
	#[error("Failed to generate a unique request id after {attempts} attempts")]
	RequestIdExhausted {
		/// Number of draws made before giving up.
		attempts: usize,
	},

	/// The host answered a custom-method call with an error.
	#[error("Custom method '{method}' failed: {message}")]
	CustomMethodFailed {
		/// Custom method name, e.g. `"getStorageValues"`.
		method: String,
		/// Host-supplied error message.
		message: String,
	},

	/// A host capability call failed.
	#[error("Host call failed: {0}")]
	Host(String),

	/// A reply arrived but does not have the expected shape.
	#[error("Protocol error: {0}")]
	Protocol(String),

	/// Caller input was rejected before anything was sent.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// The bridge was dropped before a reply arrived.
	#[error("Bridge closed before the request settled")]
	ChannelClosed,
}

impl Error {
	/// Returns the host-supplied message if this is a custom-method failure.
	pub fn remote_message(&self) -> Option<&str> {
		match self {
			Error::CustomMethodFailed { message, .. } => Some(message),
			_ => None,
		}
	}

	/// Returns true for errors that end the bridge's usefulness for the page lifetime.
	pub fn is_fatal(&self) -> bool {
		matches!(self, Error::TransportUndetectable | Error::RequestIdExhausted { .. })
	}
}
