//! Confirmation before the Mini App is closed.

use std::sync::atomic::{AtomicBool, Ordering};

use miniapp_protocol::{ClosingBehaviorParams, OutgoingEvent};
use miniapp_runtime::Bridge;

use super::Context;
use crate::error::Result;

pub struct ClosingBehavior {
	bridge: Bridge,
	confirmation: AtomicBool,
}

impl ClosingBehavior {
	pub fn new(ctx: &Context) -> Self {
		Self {
			bridge: ctx.bridge.clone(),
			confirmation: AtomicBool::new(false),
		}
	}

	/// Asks the user to confirm before the host closes the Mini App.
	pub fn enable_confirmation(&self) -> Result<()> {
		self.set(true)
	}

	pub fn disable_confirmation(&self) -> Result<()> {
		self.set(false)
	}

	/// Last value sent to the host.
	pub fn confirmation_enabled(&self) -> bool {
		self.confirmation.load(Ordering::SeqCst)
	}

	fn set(&self, need_confirmation: bool) -> Result<()> {
		self.bridge
			.post_event(&OutgoingEvent::SetupClosingBehavior(ClosingBehaviorParams { need_confirmation }))?;
		self.confirmation.store(need_confirmation, Ordering::SeqCst);
		Ok(())
	}
}
