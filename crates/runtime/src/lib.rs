//! Mini App runtime: the bridge between a page and its host client.
//!
//! This crate provides the plumbing every higher-level component sits on:
//!
//! - **Host capabilities**: traits standing in for the globals a host injects
//! - **Transport**: picking the one outbound channel the host supports
//! - **Dispatch**: routing inbound events to ordered, isolated listeners
//! - **Custom methods**: request/response correlation over fire-and-forget events
//! - **Iframe lifecycle**: the handshake, style injection, and reloads of an
//!   embedded page
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ miniapp-sdk  │  Components (buttons, popups, cloud storage, ...)
//! └──────┬───────┘
//!        │ post_event / on_event / invoke_custom_method
//! ┌──────▼───────┐
//! │   runtime    │  This crate
//! │  ┌────────┐  │
//! │  │ Bridge │  │  Dispatch + correlation
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │ Trans  │  │  Proxy / external / parent frame
//! │  └────────┘  │
//! └──────┬───────┘
//!        │ HostEnvironment
//! ┌──────▼───────┐
//! │     host     │  Browser adapter, or MockHost in tests
//! └──────────────┘
//! ```

pub mod bridge;
pub mod error;
pub mod host;
pub mod options;
pub mod registry;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bridge::{
	Bridge, EventReceiver, MAX_REQUEST_ID_ATTEMPTS, PendingCall, REQUEST_ID_ALPHABET, REQUEST_ID_LENGTH,
	RandomRequestIds, RequestIdGenerator,
};
pub use error::{Error, Result};
pub use host::{
	ExternalNotifier, FrameMessage, FrameMessageListener, HostEnvironment, MessageSource, ParentFrame,
	ReceiverSlot, StyleElement, WebViewProxy,
};
pub use options::{ANY_ORIGIN, BridgeOptions, TRUSTED_STYLE_ORIGIN};
pub use registry::{HandlerId, Listener, Subscription, listener};
pub use transport::{Transport, TransportKind, detect_transport};
