//! Event payloads, outgoing and incoming.
//!
//! Field names follow the host protocol exactly (`snake_case` on the wire).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::launch::ThemeParams;

// Outgoing

/// Payload of `web_app_setup_main_button`.
///
/// A hidden button is described by `is_visible: false` alone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MainButtonParams {
	pub is_visible: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub is_active: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub is_progress_visible: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub text_color: Option<String>,
}

impl MainButtonParams {
	/// Parameters for a hidden button.
	pub fn hidden() -> Self {
		Self::default()
	}
}

/// Payload of `web_app_setup_back_button` and `web_app_setup_settings_button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityParams {
	pub is_visible: bool,
}

/// Payload of `web_app_setup_closing_behavior`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingBehaviorParams {
	pub need_confirmation: bool,
}

/// Theme colour a header may be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeColorKey {
	BgColor,
	SecondaryBgColor,
}

/// Payload of `web_app_set_header_color`: either a theme key or an explicit colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderColor {
	Key { color_key: ThemeColorKey },
	Color { color: String },
}

/// Payload of `web_app_set_background_color`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundColorParams {
	pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactStyle {
	Light,
	Medium,
	Heavy,
	Rigid,
	Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
	Error,
	Success,
	Warning,
}

/// Payload of `web_app_trigger_haptic_feedback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HapticFeedback {
	Impact { impact_style: ImpactStyle },
	Notification { notification_type: NotificationType },
	SelectionChange,
}

/// Button kind in a native popup. `Default` and `Destructive` need a label;
/// the others are labelled by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PopupButtonKind {
	Default { text: String },
	Ok,
	Close,
	Cancel,
	Destructive { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupButton {
	pub id: String,
	#[serde(flatten)]
	pub kind: PopupButtonKind,
}

/// Payload of `web_app_open_popup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupParams {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	pub message: String,
	pub buttons: Vec<PopupButton>,
}

/// Payload of `web_app_invoke_custom_method`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeCustomMethodParams {
	pub req_id: String,
	pub method: String,
	pub params: Value,
}

/// Payload of `iframe_ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IframeReadyParams {
	pub reload_supported: bool,
}

// Incoming

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
	Cancelled,
	Failed,
	Pending,
	Paid,
}

/// Payload of `invoice_closed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceClosed {
	pub slug: String,
	pub status: InvoiceStatus,
}

/// Payload of `viewport_changed`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportChanged {
	pub height: f64,
	#[serde(default)]
	pub is_state_stable: bool,
	#[serde(default)]
	pub is_expanded: bool,
}

/// Payload of `theme_changed`.
///
/// Older hosts nest the parameters under `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeChanged {
	#[serde(alias = "data")]
	pub theme_params: ThemeParams,
}

/// Payload of `popup_closed`. `button_id` is absent when the popup was dismissed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PopupClosed {
	#[serde(default)]
	pub button_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAccessStatus {
	Allowed,
	Cancelled,
}

/// Payload of `write_access_requested`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteAccessRequested {
	pub status: WriteAccessStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneStatus {
	Sent,
	Cancelled,
}

/// Payload of `phone_requested`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneRequested {
	pub status: PhoneStatus,
}

/// Payload of `custom_method_invoked`: the reply to a custom-method call.
///
/// Exactly one of `result` and `error` is meaningful; a reply with neither
/// resolves to `null`. Hosts are not consistent about the type of `error`,
/// so it is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMethodInvoked {
	pub req_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<Value>,
}

impl CustomMethodInvoked {
	/// The host's error message, if the reply is a failure.
	///
	/// Falsy values (`null`, `""`, `false`, `0`) mean success. Non-string
	/// errors are rendered as JSON.
	pub fn error_message(&self) -> Option<String> {
		match self.error.as_ref()? {
			Value::Null | Value::Bool(false) => None,
			Value::String(message) if message.is_empty() => None,
			Value::Number(n) if n.as_f64() == Some(0.0) => None,
			Value::String(message) => Some(message.clone()),
			other => Some(other.to_string()),
		}
	}
}

/// Payload of `clipboard_text_received`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardTextReceived {
	pub req_id: String,
	#[serde(default)]
	pub data: Option<String>,
}

/// Payload of `qr_text_received`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrTextReceived {
	pub data: String,
}
