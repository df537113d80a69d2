//! Haptic feedback.

use miniapp_protocol::{HapticFeedback, ImpactStyle, NotificationType, OutgoingEvent};
use miniapp_runtime::Bridge;

use super::Context;
use crate::error::Result;

pub struct Haptics {
	bridge: Bridge,
}

impl Haptics {
	pub fn new(ctx: &Context) -> Self {
		Self {
			bridge: ctx.bridge.clone(),
		}
	}

	/// A collision between UI elements of the given weight.
	pub fn impact_occurred(&self, style: ImpactStyle) -> Result<()> {
		self.trigger(HapticFeedback::Impact { impact_style: style })
	}

	/// A task or action succeeded, failed, or produced a warning.
	pub fn notification_occurred(&self, kind: NotificationType) -> Result<()> {
		self.trigger(HapticFeedback::Notification {
			notification_type: kind,
		})
	}

	pub fn selection_changed(&self) -> Result<()> {
		self.trigger(HapticFeedback::SelectionChange)
	}

	fn trigger(&self, feedback: HapticFeedback) -> Result<()> {
		Ok(self.bridge.post_event(&OutgoingEvent::TriggerHapticFeedback(feedback))?)
	}
}
