//! Requests for user permissions the host mediates.

use miniapp_protocol::{
	IncomingEvent, OutgoingEvent, PhoneRequested, PhoneStatus, WriteAccessRequested, WriteAccessStatus,
};
use miniapp_runtime::Bridge;

use super::Context;
use crate::error::Result;
use crate::events::NextEvent;

pub struct Permissions {
	bridge: Bridge,
}

impl Permissions {
	pub fn new(ctx: &Context) -> Self {
		Self {
			bridge: ctx.bridge.clone(),
		}
	}

	/// Asks the user to let the bot message them. True if allowed.
	pub async fn request_write_access(&self) -> Result<bool> {
		let reply = NextEvent::<WriteAccessRequested>::subscribe(&self.bridge, IncomingEvent::WriteAccessRequested);
		self.bridge.post_event(&OutgoingEvent::RequestWriteAccess)?;
		Ok(reply.recv().await?.status == WriteAccessStatus::Allowed)
	}

	/// Asks the user to share their phone number with the bot. True if sent.
	pub async fn request_phone(&self) -> Result<bool> {
		let reply = NextEvent::<PhoneRequested>::subscribe(&self.bridge, IncomingEvent::PhoneRequested);
		self.bridge.post_event(&OutgoingEvent::RequestPhone)?;
		Ok(reply.recv().await?.status == PhoneStatus::Sent)
	}
}
