//! Launch parameters from the page URL fragment.
//!
//! The host opens the page with its launch parameters in the fragment:
//! `#tgWebAppData=...&tgWebAppVersion=7.0&tgWebAppPlatform=ios&...`.
//! A reload keeps the page but may drop the fragment, so the parsed
//! parameters are also kept in session storage.

use std::collections::HashMap;

use miniapp_protocol::{InitData, LaunchParams, ThemeParams};
use serde_json::Value;
use url::form_urlencoded;

use crate::error::{Error, Result};
use crate::storage::KvStorage;

/// Storage key for the last launch parameters seen.
pub const LAUNCH_PARAMS_KEY: &str = "__MiniApp__LaunchParams";

/// Decoded fragment query, last value wins for repeated names.
pub type RawLaunchParams = HashMap<String, String>;

/// Decodes a URL fragment (with or without the leading `#`) into name/value pairs.
pub fn parse_raw(fragment: &str) -> RawLaunchParams {
	let query = fragment.strip_prefix('#').unwrap_or(fragment);
	form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}

/// Extracts the fragment of a full URL, or returns the input if it has none.
pub fn fragment_of(input: &str) -> &str {
	match input.split_once('#') {
		Some((_, fragment)) => fragment,
		None => input,
	}
}

/// Builds [`LaunchParams`] from decoded fragment parameters.
///
/// Invalid init data is dropped entirely, raw string included. Theme
/// parameters are only parsed when they look like a JSON object.
pub fn parse(raw: &RawLaunchParams) -> LaunchParams {
	let mut parsed = LaunchParams::default();

	if let Some(data) = non_empty(raw, "tgWebAppData") {
		match parse_init_data(data) {
			Ok(init_data) => {
				parsed.init_data = Some(init_data);
				parsed.init_data_raw = Some(data.to_string());
			}
			Err(err) => tracing::debug!(%err, "ignoring invalid init data"),
		}
	}

	parsed.version = non_empty(raw, "tgWebAppVersion").map(|v| v.trim().to_string());
	parsed.platform = non_empty(raw, "tgWebAppPlatform").map(|v| v.trim().to_string());

	if let Some(theme) = non_empty(raw, "tgWebAppThemeParams")
		.filter(|theme| theme.starts_with('{') && theme.ends_with('}'))
	{
		match serde_json::from_str::<ThemeParams>(theme) {
			Ok(theme) => parsed.theme_params = Some(theme),
			Err(err) => tracing::debug!(%err, "ignoring invalid theme params"),
		}
	}

	parsed.show_settings = non_empty(raw, "tgWebAppShowSettings").is_some();
	parsed.bot_inline = non_empty(raw, "tgWebAppBotInline").is_some();

	parsed
}

/// Parses the `tgWebAppData` query string.
///
/// `hash` and an integer `auth_date` are required.
pub fn parse_init_data(raw: &str) -> Result<InitData> {
	let params: HashMap<String, String> = form_urlencoded::parse(raw.as_bytes()).into_owned().collect();

	let hash = non_empty(&params, "hash")
		.ok_or_else(|| Error::invalid("Invalid init data: hash is missing"))?
		.to_string();
	let auth_date = params
		.get("auth_date")
		.and_then(|v| parse_leading_int(v))
		.ok_or_else(|| Error::invalid("Invalid init data: auth_date is missing or invalid"))?;

	let json_field = |name: &str| -> Result<Option<Value>> {
		non_empty(&params, name)
			.map(serde_json::from_str::<Value>)
			.transpose()
			.map_err(Error::from)
	};

	let can_send_after = match non_empty(&params, "can_send_after") {
		Some(v) => Some(
			parse_leading_int(v).ok_or_else(|| Error::invalid("Invalid init data: can_send_after is invalid"))?,
		),
		None => None,
	};

	Ok(InitData {
		hash,
		auth_date,
		query_id: non_empty(&params, "query_id").map(str::to_string),
		user: json_field("user")?.map(serde_json::from_value).transpose()?,
		receiver: json_field("receiver")?.map(serde_json::from_value).transpose()?,
		chat: json_field("chat")?.map(serde_json::from_value).transpose()?,
		chat_type: non_empty(&params, "chat_type")
			.and_then(|v| serde_json::from_value(Value::String(v.to_string())).ok()),
		chat_instance: non_empty(&params, "chat_instance").map(str::to_string),
		start_param: non_empty(&params, "start_param").map(str::to_string),
		can_send_after,
	})
}

/// Parses the fragment and persists the result, falling back to the stored
/// copy when the fragment carries no launch parameters.
pub fn load_and_store(fragment: &str, storage: &dyn KvStorage) -> Result<LaunchParams> {
	let raw = parse_raw(fragment);
	let has_params = raw.keys().any(|name| name.starts_with("tgWebApp"));

	if !has_params {
		if let Some(stored) = storage.load(LAUNCH_PARAMS_KEY) {
			match serde_json::from_value::<LaunchParams>(stored) {
				Ok(params) => return Ok(params),
				Err(err) => tracing::debug!(%err, "discarding stored launch params"),
			}
		}
	}

	let params = parse(&raw);
	storage.save(LAUNCH_PARAMS_KEY, &serde_json::to_value(&params)?)?;
	Ok(params)
}

fn non_empty<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
	params.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

/// Integer prefix of `value`, like a lenient `parseInt`.
fn parse_leading_int(value: &str) -> Option<i64> {
	let trimmed = value.trim_start();
	let end = trimmed
		.char_indices()
		.find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
		.map_or(trimmed.len(), |(i, _)| i);
	trimmed[..end].parse().ok()
}
