//! Wire types for the Mini App host protocol.
//!
//! Every message exchanged between a Mini App page and its host, in either
//! direction, is a JSON envelope:
//!
//! ```text
//! {"eventType": "<name>", "eventData": <JSON value or null>}
//! ```
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization/deserialization
//! - **Closed sets**: Incoming and outgoing event names are enums, not strings
//! - **Stable**: Changes only when the wire protocol changes
//!
//! The bridge that moves these envelopes lives in `miniapp-runtime`.

pub mod envelope;
pub mod events;
pub mod launch;
pub mod payloads;

pub use envelope::{Envelope, EnvelopeError};
pub use events::{IncomingEvent, OutgoingEvent, UnknownEvent};
pub use launch::*;
pub use payloads::*;
