//! Launch-parameter types delivered in the page URL fragment.
//!
//! Parsing lives in the SDK; these are the shapes only.

use serde::{Deserialize, Serialize};

/// Host theme colours. Every field is optional: hosts send what they have.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThemeParams {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bg_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub secondary_bg_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hint_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub link_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub button_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub button_text_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub header_bg_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub accent_text_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub section_bg_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub section_header_text_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subtitle_text_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub destructive_text_color: Option<String>,
}

/// A Telegram user as described in init data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_bot: Option<bool>,
	pub first_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub language_code: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_premium: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub added_to_attachment_menu: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub allows_write_to_pm: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
	Group,
	Supergroup,
	Channel,
}

/// A chat the Mini App was opened from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
	pub id: i64,
	#[serde(rename = "type")]
	pub kind: ChatKind,
	pub title: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub photo_url: Option<String>,
}

/// Type of the chat the Mini App was opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
	Sender,
	Private,
	Group,
	Supergroup,
	Channel,
}

/// Parsed `tgWebAppData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitData {
	pub hash: String,
	pub auth_date: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user: Option<User>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub receiver: Option<User>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chat: Option<Chat>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chat_type: Option<ChatType>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chat_instance: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub start_param: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub can_send_after: Option<i64>,
}

/// Everything the host passes to the page at launch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchParams {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub init_data_raw: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub init_data: Option<InitData>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub platform: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub theme_params: Option<ThemeParams>,
	#[serde(default)]
	pub show_settings: bool,
	#[serde(default)]
	pub bot_inline: bool,
}
