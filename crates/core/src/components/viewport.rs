//! Visible area of the Mini App, as reported by `viewport_changed`.

use std::sync::{Arc, Weak};

use miniapp_protocol::{IncomingEvent, OutgoingEvent, ViewportChanged};
use miniapp_runtime::{Bridge, Subscription};
use parking_lot::Mutex;

use super::Context;
use crate::error::Result;
use crate::handlers::{CallbackSubscription, Callbacks};

/// Last reported viewport. `height` is `None` until the host reports one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportState {
	pub height: Option<f64>,
	/// Height once the current animation settles.
	pub stable_height: Option<f64>,
	pub is_expanded: bool,
}

struct Inner {
	bridge: Bridge,
	state: Mutex<ViewportState>,
	changes: Callbacks,
}

pub struct Viewport {
	inner: Arc<Inner>,
	_changed: Subscription,
}

impl Viewport {
	pub fn new(ctx: &Context) -> Self {
		let inner = Arc::new(Inner {
			bridge: ctx.bridge.clone(),
			state: Mutex::new(ViewportState::default()),
			changes: Callbacks::default(),
		});

		let weak: Weak<Inner> = Arc::downgrade(&inner);
		let changed = ctx
			.bridge
			.on_event_typed(IncomingEvent::ViewportChanged, move |event: ViewportChanged| {
				let Some(inner) = weak.upgrade() else {
					return;
				};
				{
					let mut state = inner.state.lock();
					state.height = Some(event.height);
					state.is_expanded = event.is_expanded;
					if event.is_state_stable {
						state.stable_height = Some(event.height);
					}
				}
				inner.changes.trigger();
			});

		Self {
			inner,
			_changed: changed,
		}
	}

	pub fn state(&self) -> ViewportState {
		*self.inner.state.lock()
	}

	pub fn is_expanded(&self) -> bool {
		self.inner.state.lock().is_expanded
	}

	/// Runs `callback` after every viewport report.
	pub fn on_change<F>(&self, callback: F) -> CallbackSubscription
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.inner.changes.add(callback)
	}

	/// Asks the host to report the viewport.
	pub fn request_update(&self) -> Result<()> {
		Ok(self.inner.bridge.post_event(&OutgoingEvent::RequestViewport)?)
	}

	/// Expands the Mini App to its maximum height.
	pub fn expand(&self) -> Result<()> {
		Ok(self.inner.bridge.post_event(&OutgoingEvent::WebAppExpand)?)
	}
}
