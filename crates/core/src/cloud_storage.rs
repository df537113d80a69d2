//! Per-user key/value storage kept by the host, reached through custom methods.

use std::sync::LazyLock;

use indexmap::IndexMap;
use miniapp_runtime::Bridge;
use regex::Regex;
use serde_json::{Value, json};

use crate::error::{Error, Result};

/// Largest value, in UTF-8 bytes.
pub const MAX_VALUE_BYTES: usize = 4096;

static KEY_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("key pattern is valid"));

const SAVE_METHOD: &str = "saveStorageValue";
const GET_METHOD: &str = "getStorageValues";
const DELETE_METHOD: &str = "deleteStorageValues";
const KEYS_METHOD: &str = "getStorageKeys";

/// Host-side storage. Keys and values are validated before anything is sent.
pub struct CloudStorage {
	bridge: Bridge,
}

impl CloudStorage {
	pub fn new(bridge: Bridge) -> Self {
		Self { bridge }
	}

	pub async fn set_item(&self, key: &str, value: &str) -> Result<()> {
		validate_key(key)?;
		validate_value(value)?;

		let result = self
			.bridge
			.invoke_custom_method(SAVE_METHOD, json!({"key": key, "value": value}))?
			.await?;
		expect_true(result, "Item was not stored in the Cloud Storage")
	}

	pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
		validate_key(key)?;
		let mut items = self.get_items(&[key]).await?;
		Ok(items.shift_remove(key).flatten())
	}

	/// Values for `keys`, in request order; missing keys map to `None`.
	pub async fn get_items(&self, keys: &[&str]) -> Result<IndexMap<String, Option<String>>> {
		for key in keys {
			validate_key(key)?;
		}

		let result = self
			.bridge
			.invoke_custom_method(GET_METHOD, json!({"keys": keys}))?
			.await?;
		let Value::Object(found) = result else {
			return Err(Error::UnexpectedReply(format!("{GET_METHOD} returned {result}")));
		};

		Ok(keys
			.iter()
			.map(|key| {
				let value = found.get(*key).and_then(Value::as_str).map(str::to_string);
				(key.to_string(), value)
			})
			.collect())
	}

	pub async fn remove_item(&self, key: &str) -> Result<()> {
		validate_key(key)?;
		self.remove_items(&[key]).await
	}

	pub async fn remove_items(&self, keys: &[&str]) -> Result<()> {
		for key in keys {
			validate_key(key)?;
		}

		let result = self
			.bridge
			.invoke_custom_method(DELETE_METHOD, json!({"keys": keys}))?
			.await?;
		expect_true(result, "Items were not deleted from the Cloud Storage")
	}

	pub async fn get_keys(&self) -> Result<Vec<String>> {
		let keys: Vec<String> = self.bridge.invoke_custom_method(KEYS_METHOD, json!({}))?.json().await?;
		Ok(keys)
	}
}

pub fn validate_key(key: &str) -> Result<()> {
	if KEY_PATTERN.is_match(key) {
		Ok(())
	} else {
		Err(Error::invalid(format!(
			"Cloud Storage key \"{key}\" is invalid, it must be 1-128 characters long, only A-Z, a-z, 0-9, _ and - are allowed"
		)))
	}
}

pub fn validate_value(value: &str) -> Result<()> {
	let size = value.len();
	if size > MAX_VALUE_BYTES {
		return Err(Error::invalid(format!(
			"Cloud Storage value is too big, it must be at most {MAX_VALUE_BYTES} bytes long, but actual size is {size}"
		)));
	}
	Ok(())
}

fn expect_true(result: Value, message: &str) -> Result<()> {
	match result {
		Value::Bool(true) => Ok(()),
		_ => Err(Error::UnexpectedReply(message.to_string())),
	}
}
