//! Closed sets of incoming and outgoing event names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::envelope::Envelope;
use crate::payloads::{
	BackgroundColorParams, ClosingBehaviorParams, HapticFeedback, HeaderColor, IframeReadyParams,
	InvokeCustomMethodParams, MainButtonParams, PopupParams, VisibilityParams,
};

/// An event name outside the known incoming set.
#[derive(Debug, Clone, Error)]
#[error("unknown incoming event: {0}")]
pub struct UnknownEvent(pub String);

/// Events the host delivers to the page.
///
/// `SetCustomStyle` and `ReloadIframe` are only meaningful inside an iframe,
/// where the bridge intercepts them before ordinary dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomingEvent {
	MainButtonPressed,
	SettingsButtonPressed,
	BackButtonPressed,
	InvoiceClosed,
	ViewportChanged,
	ThemeChanged,
	PopupClosed,
	WriteAccessRequested,
	PhoneRequested,
	CustomMethodInvoked,
	ClipboardTextReceived,
	QrTextReceived,
	ScanQrPopupClosed,
	SetCustomStyle,
	ReloadIframe,
}

impl IncomingEvent {
	/// Every known incoming event, in declaration order.
	pub const ALL: [IncomingEvent; 15] = [
		Self::MainButtonPressed,
		Self::SettingsButtonPressed,
		Self::BackButtonPressed,
		Self::InvoiceClosed,
		Self::ViewportChanged,
		Self::ThemeChanged,
		Self::PopupClosed,
		Self::WriteAccessRequested,
		Self::PhoneRequested,
		Self::CustomMethodInvoked,
		Self::ClipboardTextReceived,
		Self::QrTextReceived,
		Self::ScanQrPopupClosed,
		Self::SetCustomStyle,
		Self::ReloadIframe,
	];

	/// Wire name of the event.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::MainButtonPressed => "main_button_pressed",
			Self::SettingsButtonPressed => "settings_button_pressed",
			Self::BackButtonPressed => "back_button_pressed",
			Self::InvoiceClosed => "invoice_closed",
			Self::ViewportChanged => "viewport_changed",
			Self::ThemeChanged => "theme_changed",
			Self::PopupClosed => "popup_closed",
			Self::WriteAccessRequested => "write_access_requested",
			Self::PhoneRequested => "phone_requested",
			Self::CustomMethodInvoked => "custom_method_invoked",
			Self::ClipboardTextReceived => "clipboard_text_received",
			Self::QrTextReceived => "qr_text_received",
			Self::ScanQrPopupClosed => "scan_qr_popup_closed",
			Self::SetCustomStyle => "set_custom_style",
			Self::ReloadIframe => "reload_iframe",
		}
	}
}

impl FromStr for IncomingEvent {
	type Err = UnknownEvent;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|event| event.as_str() == s)
			.ok_or_else(|| UnknownEvent(s.to_string()))
	}
}

impl fmt::Display for IncomingEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Events the page sends to the host, each carrying the payload its name
/// requires.
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingEvent {
	WebAppReady,
	WebAppExpand,
	WebAppClose,
	SetupMainButton(MainButtonParams),
	SetupBackButton(VisibilityParams),
	SetupSettingsButton(VisibilityParams),
	SetupClosingBehavior(ClosingBehaviorParams),
	SetHeaderColor(HeaderColor),
	SetBackgroundColor(BackgroundColorParams),
	RequestTheme,
	RequestViewport,
	TriggerHapticFeedback(HapticFeedback),
	OpenPopup(PopupParams),
	RequestWriteAccess,
	RequestPhone,
	InvokeCustomMethod(InvokeCustomMethodParams),
	IframeReady(IframeReadyParams),
	IframeWillReload,
}

impl OutgoingEvent {
	/// Wire name of the event.
	pub fn name(&self) -> &'static str {
		match self {
			Self::WebAppReady => "web_app_ready",
			Self::WebAppExpand => "web_app_expand",
			Self::WebAppClose => "web_app_close",
			Self::SetupMainButton(_) => "web_app_setup_main_button",
			Self::SetupBackButton(_) => "web_app_setup_back_button",
			Self::SetupSettingsButton(_) => "web_app_setup_settings_button",
			Self::SetupClosingBehavior(_) => "web_app_setup_closing_behavior",
			Self::SetHeaderColor(_) => "web_app_set_header_color",
			Self::SetBackgroundColor(_) => "web_app_set_background_color",
			Self::RequestTheme => "web_app_request_theme",
			Self::RequestViewport => "web_app_request_viewport",
			Self::TriggerHapticFeedback(_) => "web_app_trigger_haptic_feedback",
			Self::OpenPopup(_) => "web_app_open_popup",
			Self::RequestWriteAccess => "web_app_request_write_access",
			Self::RequestPhone => "web_app_request_phone",
			Self::InvokeCustomMethod(_) => "web_app_invoke_custom_method",
			Self::IframeReady(_) => "iframe_ready",
			Self::IframeWillReload => "iframe_will_reload",
		}
	}

	/// Payload of the event, `None` for events that carry no data.
	pub fn data(&self) -> Result<Option<Value>, serde_json::Error> {
		let value = match self {
			Self::WebAppReady
			| Self::WebAppExpand
			| Self::WebAppClose
			| Self::RequestTheme
			| Self::RequestViewport
			| Self::RequestWriteAccess
			| Self::RequestPhone
			| Self::IframeWillReload => return Ok(None),
			Self::SetupMainButton(params) => serde_json::to_value(params)?,
			Self::SetupBackButton(params) | Self::SetupSettingsButton(params) => serde_json::to_value(params)?,
			Self::SetupClosingBehavior(params) => serde_json::to_value(params)?,
			Self::SetHeaderColor(params) => serde_json::to_value(params)?,
			Self::SetBackgroundColor(params) => serde_json::to_value(params)?,
			Self::TriggerHapticFeedback(params) => serde_json::to_value(params)?,
			Self::OpenPopup(params) => serde_json::to_value(params)?,
			Self::InvokeCustomMethod(params) => serde_json::to_value(params)?,
			Self::IframeReady(params) => serde_json::to_value(params)?,
		};
		Ok(Some(value))
	}

	/// Builds the wire envelope for this event.
	pub fn to_envelope(&self) -> Result<Envelope, serde_json::Error> {
		Ok(Envelope::new(self.name(), self.data()?))
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::payloads::{ImpactStyle, ThemeColorKey};

	#[test]
	fn test_incoming_names_round_trip() {
		for event in IncomingEvent::ALL {
			assert_eq!(event.as_str().parse::<IncomingEvent>().unwrap(), event);
			let serialized = serde_json::to_value(event).unwrap();
			assert_eq!(serialized, json!(event.as_str()));
		}
	}

	#[test]
	fn test_unknown_incoming_name() {
		let err = "main_button_clicked".parse::<IncomingEvent>().unwrap_err();
		assert_eq!(err.0, "main_button_clicked");
	}

	#[test]
	fn test_tag_only_events_have_null_data() {
		let envelope = OutgoingEvent::WebAppExpand.to_envelope().unwrap();
		assert_eq!(envelope.event_type, "web_app_expand");
		assert_eq!(envelope.event_data, Value::Null);
	}

	#[test]
	fn test_payload_events() {
		let event = OutgoingEvent::SetupBackButton(VisibilityParams { is_visible: true });
		assert_eq!(event.data().unwrap(), Some(json!({"is_visible": true})));

		let event = OutgoingEvent::TriggerHapticFeedback(HapticFeedback::Impact {
			impact_style: ImpactStyle::Rigid,
		});
		assert_eq!(event.name(), "web_app_trigger_haptic_feedback");
		assert_eq!(event.data().unwrap(), Some(json!({"type": "impact", "impact_style": "rigid"})));

		let event = OutgoingEvent::SetHeaderColor(HeaderColor::Key {
			color_key: ThemeColorKey::SecondaryBgColor,
		});
		assert_eq!(event.data().unwrap(), Some(json!({"color_key": "secondary_bg_color"})));
	}

	#[test]
	fn test_iframe_ready_payload() {
		let event = OutgoingEvent::IframeReady(IframeReadyParams { reload_supported: true });
		let envelope = event.to_envelope().unwrap();
		assert_eq!(
			serde_json::to_value(&envelope).unwrap(),
			json!({"eventType": "iframe_ready", "eventData": {"reload_supported": true}})
		);
	}
}
