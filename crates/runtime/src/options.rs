//! Bridge construction options.

use serde::{Deserialize, Serialize};

/// Wildcard target origin used when posting to the parent frame.
pub const ANY_ORIGIN: &str = "*";

/// Origin allowed to inject custom styles into an embedded page.
pub const TRUSTED_STYLE_ORIGIN: &str = "https://web.telegram.org";

/// Options accepted by [`Bridge::new`](crate::Bridge::new).
///
/// Deserializes from `{"trustedTargetOrigin": "...", "legacyReceivers": bool}`,
/// both optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeOptions {
	/// Target origin for `postMessage` to the parent frame.
	pub trusted_target_origin: String,
	/// Install the inbound entry point under the legacy global names.
	pub legacy_receivers: bool,
}

impl Default for BridgeOptions {
	fn default() -> Self {
		Self {
			trusted_target_origin: ANY_ORIGIN.to_string(),
			legacy_receivers: true,
		}
	}
}

impl BridgeOptions {
	/// Restricts parent-frame messages to the given origin.
	pub fn with_trusted_target_origin(mut self, origin: impl Into<String>) -> Self {
		self.trusted_target_origin = origin.into();
		self
	}

	/// Enables or disables the legacy global receiver slots.
	pub fn with_legacy_receivers(mut self, enabled: bool) -> Self {
		self.legacy_receivers = enabled;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let options = BridgeOptions::default();
		assert_eq!(options.trusted_target_origin, "*");
		assert!(options.legacy_receivers);
	}

	#[test]
	fn test_partial_json() {
		let options: BridgeOptions =
			serde_json::from_str(r#"{"trustedTargetOrigin": "https://web.telegram.org"}"#).unwrap();
		assert_eq!(options.trusted_target_origin, "https://web.telegram.org");
		assert!(options.legacy_receivers);
	}
}
