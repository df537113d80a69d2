//! Back and settings buttons: host-drawn, visibility is their only state.

use std::sync::{Arc, Weak};

use miniapp_protocol::{IncomingEvent, OutgoingEvent, VisibilityParams};
use miniapp_runtime::Subscription;
use serde::{Deserialize, Serialize};

use super::Context;
use crate::error::Result;
use crate::handlers::{CallbackSubscription, Callbacks};
use crate::state::State;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct VisibilityState {
	visible: bool,
}

struct Inner {
	state: State<VisibilityState>,
	clicks: Callbacks,
}

/// Shared implementation: persists `{visible}`, mirrors it with `setup`, and
/// fires clicks on `pressed` only while visible.
struct ToggleButton {
	inner: Arc<Inner>,
	_pressed: Subscription,
}

impl ToggleButton {
	fn new(
		ctx: &Context,
		name: &str,
		pressed: IncomingEvent,
		setup: fn(VisibilityParams) -> OutgoingEvent,
	) -> Self {
		let bridge = ctx.bridge.clone();
		let state = State::new(Arc::clone(&ctx.storage), name, VisibilityState::default).with_before_change(
			move |new: VisibilityState, _old| {
				bridge.post_event(&setup(VisibilityParams {
					is_visible: new.visible,
				}))?;
				Ok(new)
			},
		);

		let inner = Arc::new(Inner {
			state,
			clicks: Callbacks::default(),
		});

		let weak: Weak<Inner> = Arc::downgrade(&inner);
		let subscription = ctx.bridge.on_event(pressed, move |_| {
			let Some(inner) = weak.upgrade() else {
				return;
			};
			if inner.state.load().visible {
				inner.clicks.trigger();
			}
		});

		Self {
			inner,
			_pressed: subscription,
		}
	}

	fn visible(&self) -> bool {
		self.inner.state.load().visible
	}

	fn set_visible(&self, visible: bool) -> Result<()> {
		self.inner.state.save(VisibilityState { visible }).map(|_| ())
	}

	fn on_click<F>(&self, callback: F) -> CallbackSubscription
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.inner.clicks.add(callback)
	}
}

/// The back button in the Mini App header.
pub struct BackButton(ToggleButton);

impl BackButton {
	pub fn new(ctx: &Context) -> Self {
		Self(ToggleButton::new(
			ctx,
			"BackButton",
			IncomingEvent::BackButtonPressed,
			OutgoingEvent::SetupBackButton,
		))
	}

	pub fn visible(&self) -> bool {
		self.0.visible()
	}

	pub fn set_visible(&self, visible: bool) -> Result<()> {
		self.0.set_visible(visible)
	}

	pub fn show(&self) -> Result<()> {
		self.set_visible(true)
	}

	pub fn hide(&self) -> Result<()> {
		self.set_visible(false)
	}

	/// Runs `callback` when the button is pressed while visible.
	pub fn on_click<F>(&self, callback: F) -> CallbackSubscription
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.0.on_click(callback)
	}
}

/// The "Settings" item in the Mini App context menu.
pub struct SettingsButton(ToggleButton);

impl SettingsButton {
	pub fn new(ctx: &Context) -> Self {
		Self(ToggleButton::new(
			ctx,
			"SettingsButton",
			IncomingEvent::SettingsButtonPressed,
			OutgoingEvent::SetupSettingsButton,
		))
	}

	pub fn visible(&self) -> bool {
		self.0.visible()
	}

	pub fn set_visible(&self, visible: bool) -> Result<()> {
		self.0.set_visible(visible)
	}

	pub fn show(&self) -> Result<()> {
		self.set_visible(true)
	}

	pub fn hide(&self) -> Result<()> {
		self.set_visible(false)
	}

	/// Runs `callback` when the item is chosen while visible.
	pub fn on_click<F>(&self, callback: F) -> CallbackSubscription
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.0.on_click(callback)
	}
}
