//! Error types for the SDK.

use thiserror::Error;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by SDK components.
#[derive(Debug, Error)]
pub enum Error {
	/// The bridge failed: no transport, host call failure, or a custom-method error.
	#[error(transparent)]
	Bridge(#[from] miniapp_runtime::Error),

	/// Caller input was rejected before anything was sent to the host.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// The host answered, but not with what the operation requires.
	#[error("Unexpected reply: {0}")]
	UnexpectedReply(String),

	/// Persisted state could not be read or written.
	#[error("Storage error: {0}")]
	Storage(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// The host never answered and the bridge went away.
	#[error("Bridge closed before a reply arrived")]
	ChannelClosed,
}

impl Error {
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Error::InvalidArgument(message.into())
	}
}
