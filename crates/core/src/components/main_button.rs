//! The host-drawn button at the bottom of the Mini App.

use std::sync::{Arc, Weak};

use miniapp_protocol::{IncomingEvent, MainButtonParams, OutgoingEvent};
use miniapp_runtime::{Bridge, Subscription};
use serde::{Deserialize, Serialize};

use super::{Context, Theming};
use crate::error::{Error, Result};
use crate::handlers::{CallbackSubscription, Callbacks};
use crate::state::State;

/// Persisted main button state. Unset colours follow the theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainButtonState {
	pub text: String,
	pub text_color: Option<String>,
	pub bg_color: Option<String>,
	pub visible: bool,
	pub enabled: bool,
	pub loading: bool,
}

impl Default for MainButtonState {
	fn default() -> Self {
		Self {
			text: "CONTINUE".to_string(),
			text_color: None,
			bg_color: None,
			visible: false,
			enabled: true,
			loading: false,
		}
	}
}

struct Inner {
	state: State<MainButtonState>,
	theming: Theming,
	clicks: Callbacks,
}

/// The main button. Every state change is mirrored to the host.
pub struct MainButton {
	inner: Arc<Inner>,
	_pressed: Subscription,
}

impl MainButton {
	pub fn new(ctx: &Context, theming: Theming) -> Self {
		let state = State::new(Arc::clone(&ctx.storage), "MainButton", MainButtonState::default)
			.with_before_change({
				let bridge = ctx.bridge.clone();
				let theming = theming.clone();
				move |new, _old| apply(&bridge, &theming, new)
			});

		let inner = Arc::new(Inner {
			state,
			theming,
			clicks: Callbacks::default(),
		});

		let weak: Weak<Inner> = Arc::downgrade(&inner);
		let pressed = ctx.bridge.on_event(IncomingEvent::MainButtonPressed, move |_| {
			let Some(inner) = weak.upgrade() else {
				return;
			};
			let state = inner.state.load();
			if state.visible && state.enabled {
				inner.clicks.trigger();
			}
		});

		Self {
			inner,
			_pressed: pressed,
		}
	}

	pub fn state(&self) -> MainButtonState {
		self.inner.state.load()
	}

	pub fn text(&self) -> String {
		self.state().text
	}

	/// Sets the label. It is trimmed and must not end up empty.
	pub fn set_text(&self, text: &str) -> Result<()> {
		self.update(|s| s.text = text.to_string())
	}

	pub fn text_color(&self) -> String {
		self.state()
			.text_color
			.unwrap_or_else(|| self.inner.theming.colors().button_text)
	}

	pub fn set_text_color(&self, color: &str) -> Result<()> {
		self.update(|s| s.text_color = Some(color.to_string()))
	}

	pub fn bg_color(&self) -> String {
		self.state()
			.bg_color
			.unwrap_or_else(|| self.inner.theming.colors().button)
	}

	pub fn set_bg_color(&self, color: &str) -> Result<()> {
		self.update(|s| s.bg_color = Some(color.to_string()))
	}

	pub fn visible(&self) -> bool {
		self.state().visible
	}

	pub fn set_visible(&self, visible: bool) -> Result<()> {
		self.update(|s| s.visible = visible)
	}

	pub fn show(&self) -> Result<()> {
		self.set_visible(true)
	}

	pub fn hide(&self) -> Result<()> {
		self.set_visible(false)
	}

	pub fn enabled(&self) -> bool {
		self.state().enabled
	}

	pub fn enable(&self) -> Result<()> {
		self.update(|s| s.enabled = true)
	}

	pub fn disable(&self) -> Result<()> {
		self.update(|s| s.enabled = false)
	}

	pub fn loading(&self) -> bool {
		self.state().loading
	}

	pub fn start_loading(&self) -> Result<()> {
		self.update(|s| s.loading = true)
	}

	pub fn stop_loading(&self) -> Result<()> {
		self.update(|s| s.loading = false)
	}

	/// Applies several changes at once, sending a single update to the host.
	pub fn update<F>(&self, change: F) -> Result<()>
	where
		F: FnOnce(&mut MainButtonState),
	{
		self.inner.state.update(change).map(|_| ())
	}

	/// Runs `callback` when the button is pressed while visible and enabled.
	pub fn on_click<F>(&self, callback: F) -> CallbackSubscription
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.inner.clicks.add(callback)
	}
}

fn apply(bridge: &Bridge, theming: &Theming, mut state: MainButtonState) -> Result<MainButtonState> {
	state.text = state.text.trim().to_string();
	if state.text.is_empty() {
		return Err(Error::invalid("Main Button text must not be empty"));
	}

	let params = if state.visible {
		let colors = theming.colors();
		MainButtonParams {
			is_visible: true,
			is_active: Some(state.enabled),
			is_progress_visible: Some(state.loading),
			text: Some(state.text.clone()),
			color: Some(state.bg_color.clone().unwrap_or(colors.button)),
			text_color: Some(state.text_color.clone().unwrap_or(colors.button_text)),
		}
	} else {
		MainButtonParams::hidden()
	};

	bridge.post_event(&OutgoingEvent::SetupMainButton(params))?;
	Ok(state)
}
