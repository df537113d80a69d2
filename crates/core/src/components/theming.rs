//! Theme parameters and the colours derived from them.

use std::sync::{Arc, LazyLock, Weak};

use miniapp_protocol::{
	BackgroundColorParams, HeaderColor, IncomingEvent, OutgoingEvent, ThemeChanged, ThemeParams,
};
use miniapp_runtime::{Bridge, Subscription};
use parking_lot::Mutex;
use regex::Regex;

use super::Context;
use crate::error::{Error, Result};
use crate::handlers::{CallbackSubscription, Callbacks};

static HEX_COLOR: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").expect("colour pattern is valid"));

const DEFAULT_BG: &str = "#ffffff";
const DEFAULT_SECONDARY_BG: &str = "#efeff3";
const DEFAULT_TEXT: &str = "#000000";
const DEFAULT_HINT: &str = "#999999";
const DEFAULT_LINK: &str = "#2481cc";
const DEFAULT_BUTTON: &str = "#2481cc";
const DEFAULT_BUTTON_TEXT: &str = "#ffffff";

/// Resolved theme colours, falling back to a light palette for anything the
/// host did not send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeColors {
	pub bg: String,
	pub secondary_bg: String,
	pub text: String,
	pub hint: String,
	pub link: String,
	pub button: String,
	pub button_text: String,
}

impl ThemeColors {
	pub fn from_params(params: &ThemeParams) -> Self {
		let pick = |value: &Option<String>, default: &str| value.clone().unwrap_or_else(|| default.to_string());
		Self {
			bg: pick(&params.bg_color, DEFAULT_BG),
			secondary_bg: pick(&params.secondary_bg_color, DEFAULT_SECONDARY_BG),
			text: pick(&params.text_color, DEFAULT_TEXT),
			hint: pick(&params.hint_color, DEFAULT_HINT),
			link: pick(&params.link_color, DEFAULT_LINK),
			button: pick(&params.button_color, DEFAULT_BUTTON),
			button_text: pick(&params.button_text_color, DEFAULT_BUTTON_TEXT),
		}
	}
}

struct Inner {
	bridge: Bridge,
	params: Mutex<ThemeParams>,
	changes: Callbacks,
}

/// Current theme, kept in sync with `theme_changed`.
#[derive(Clone)]
pub struct Theming {
	inner: Arc<Inner>,
	_changed: Arc<Subscription>,
}

impl Theming {
	pub fn new(ctx: &Context) -> Self {
		let inner = Arc::new(Inner {
			bridge: ctx.bridge.clone(),
			params: Mutex::new(ctx.launch_params.theme_params.clone().unwrap_or_default()),
			changes: Callbacks::default(),
		});

		let weak: Weak<Inner> = Arc::downgrade(&inner);
		let changed = ctx
			.bridge
			.on_event_typed(IncomingEvent::ThemeChanged, move |event: ThemeChanged| {
				let Some(inner) = weak.upgrade() else {
					return;
				};
				*inner.params.lock() = event.theme_params;
				inner.changes.trigger();
			});

		Self {
			inner,
			_changed: Arc::new(changed),
		}
	}

	pub fn params(&self) -> ThemeParams {
		self.inner.params.lock().clone()
	}

	pub fn colors(&self) -> ThemeColors {
		ThemeColors::from_params(&self.inner.params.lock())
	}

	/// Runs `callback` after every theme change.
	pub fn on_change<F>(&self, callback: F) -> CallbackSubscription
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.inner.changes.add(callback)
	}

	/// Asks the host to resend the theme.
	pub fn request_update(&self) -> Result<()> {
		Ok(self.inner.bridge.post_event(&OutgoingEvent::RequestTheme)?)
	}

	pub fn set_header_color(&self, color: HeaderColor) -> Result<()> {
		if let HeaderColor::Color { color } = &color {
			validate_hex_color(color)?;
		}
		Ok(self.inner.bridge.post_event(&OutgoingEvent::SetHeaderColor(color))?)
	}

	pub fn set_background_color(&self, color: &str) -> Result<()> {
		validate_hex_color(color)?;
		let event = OutgoingEvent::SetBackgroundColor(BackgroundColorParams {
			color: color.to_string(),
		});
		Ok(self.inner.bridge.post_event(&event)?)
	}
}

/// Accepts `#rgb` and `#rrggbb`.
fn validate_hex_color(color: &str) -> Result<()> {
	if HEX_COLOR.is_match(color) {
		Ok(())
	} else {
		Err(Error::invalid(format!("\"{color}\" is not a hex colour")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_colors_fall_back_to_defaults() {
		let colors = ThemeColors::from_params(&ThemeParams {
			bg_color: Some("#17212b".into()),
			..ThemeParams::default()
		});
		assert_eq!(colors.bg, "#17212b");
		assert_eq!(colors.text, "#000000");
		assert_eq!(colors.button, "#2481cc");
		assert_eq!(colors.button_text, "#ffffff");
	}

	#[test]
	fn test_hex_color_validation() {
		assert!(validate_hex_color("#fff").is_ok());
		assert!(validate_hex_color("#A1B2C3").is_ok());
		assert!(validate_hex_color("fff").is_err());
		assert!(validate_hex_color("#ffff").is_err());
		assert!(validate_hex_color("#gggggg").is_err());
		assert!(validate_hex_color("#fff\n").is_err());
		assert!(validate_hex_color("#ffffff00").is_err());
	}
}
