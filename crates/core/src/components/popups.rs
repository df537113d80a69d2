//! Native popups: free-form, alert, and confirm.

use miniapp_protocol::{IncomingEvent, OutgoingEvent, PopupButton, PopupButtonKind, PopupClosed, PopupParams};
use miniapp_runtime::Bridge;

use super::Context;
use crate::error::{Error, Result};
use crate::events::NextEvent;

/// Longest popup message, in characters.
pub const MAX_POPUP_MESSAGE: usize = 256;
/// Longest popup title, in characters.
pub const MAX_POPUP_TITLE: usize = 64;
/// Longest button label or id, in characters.
pub const MAX_POPUP_BUTTON_TEXT: usize = 64;
pub const MAX_POPUP_BUTTONS: usize = 3;

const OK_BUTTON_ID: &str = "ok";
const CANCEL_BUTTON_ID: &str = "cancel";
const CLOSE_BUTTON_ID: &str = "close";

pub struct Popups {
	bridge: Bridge,
}

impl Popups {
	pub fn new(ctx: &Context) -> Self {
		Self {
			bridge: ctx.bridge.clone(),
		}
	}

	/// Shows a popup and resolves with the id of the pressed button, or
	/// `None` if it was dismissed.
	pub async fn popup(&self, params: PopupParams) -> Result<Option<String>> {
		validate_popup(&params)?;

		let closed = NextEvent::<PopupClosed>::subscribe(&self.bridge, IncomingEvent::PopupClosed);
		self.bridge.post_event(&OutgoingEvent::OpenPopup(params))?;
		Ok(closed.recv().await?.button_id)
	}

	/// Shows `message` with a single close button.
	pub async fn alert(&self, message: &str) -> Result<()> {
		self.popup(PopupParams {
			title: None,
			message: message.to_string(),
			buttons: vec![PopupButton {
				id: CLOSE_BUTTON_ID.to_string(),
				kind: PopupButtonKind::Close,
			}],
		})
		.await
		.map(|_| ())
	}

	/// Shows `message` with OK and Cancel; true iff OK was pressed.
	pub async fn confirm(&self, message: &str) -> Result<bool> {
		let pressed = self
			.popup(PopupParams {
				title: None,
				message: message.to_string(),
				buttons: vec![
					PopupButton {
						id: OK_BUTTON_ID.to_string(),
						kind: PopupButtonKind::Ok,
					},
					PopupButton {
						id: CANCEL_BUTTON_ID.to_string(),
						kind: PopupButtonKind::Cancel,
					},
				],
			})
			.await?;
		Ok(pressed.as_deref() == Some(OK_BUTTON_ID))
	}
}

/// Checks the limits the host enforces on popups.
pub fn validate_popup(params: &PopupParams) -> Result<()> {
	let message_len = params.message.chars().count();
	if message_len == 0 || message_len > MAX_POPUP_MESSAGE {
		return Err(Error::invalid(format!(
			"Popup message must be 1-{MAX_POPUP_MESSAGE} characters long, got {message_len}"
		)));
	}

	if let Some(title) = &params.title {
		let title_len = title.chars().count();
		if title_len > MAX_POPUP_TITLE {
			return Err(Error::invalid(format!(
				"Popup title must be at most {MAX_POPUP_TITLE} characters long, got {title_len}"
			)));
		}
	}

	if params.buttons.is_empty() || params.buttons.len() > MAX_POPUP_BUTTONS {
		return Err(Error::invalid(format!(
			"Popup must have 1-{MAX_POPUP_BUTTONS} buttons, got {}",
			params.buttons.len()
		)));
	}

	for button in &params.buttons {
		if button.id.chars().count() > MAX_POPUP_BUTTON_TEXT {
			return Err(Error::invalid(format!(
				"Popup button id \"{}\" is longer than {MAX_POPUP_BUTTON_TEXT} characters",
				button.id
			)));
		}
		if let PopupButtonKind::Default { text } | PopupButtonKind::Destructive { text } = &button.kind {
			let text_len = text.chars().count();
			if text_len == 0 || text_len > MAX_POPUP_BUTTON_TEXT {
				return Err(Error::invalid(format!(
					"Popup button text must be 1-{MAX_POPUP_BUTTON_TEXT} characters long, got {text_len}"
				)));
			}
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ok_button() -> PopupButton {
		PopupButton {
			id: "ok".into(),
			kind: PopupButtonKind::Ok,
		}
	}

	fn params(message: &str, buttons: Vec<PopupButton>) -> PopupParams {
		PopupParams {
			title: None,
			message: message.into(),
			buttons,
		}
	}

	#[test]
	fn test_message_length_bounds() {
		assert!(validate_popup(&params("", vec![ok_button()])).is_err());
		assert!(validate_popup(&params(&"x".repeat(256), vec![ok_button()])).is_ok());
		assert!(validate_popup(&params(&"x".repeat(257), vec![ok_button()])).is_err());
		// Characters, not bytes.
		assert!(validate_popup(&params(&"é".repeat(256), vec![ok_button()])).is_ok());
	}

	#[test]
	fn test_button_count_bounds() {
		assert!(validate_popup(&params("hi", vec![])).is_err());
		assert!(validate_popup(&params("hi", vec![ok_button(); 3])).is_ok());
		assert!(validate_popup(&params("hi", vec![ok_button(); 4])).is_err());
	}

	#[test]
	fn test_title_and_button_text_bounds() {
		let mut with_title = params("hi", vec![ok_button()]);
		with_title.title = Some("t".repeat(65));
		assert!(validate_popup(&with_title).is_err());

		let labelled = |text: String| PopupButton {
			id: "b".into(),
			kind: PopupButtonKind::Default { text },
		};
		assert!(validate_popup(&params("hi", vec![labelled("x".repeat(64))])).is_ok());
		assert!(validate_popup(&params("hi", vec![labelled("x".repeat(65))])).is_err());
		assert!(validate_popup(&params("hi", vec![labelled(String::new())])).is_err());
	}
}
