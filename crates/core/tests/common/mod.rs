#![allow(dead_code)]

use std::sync::Arc;

use miniapp::{BridgeOptions, MemoryStorage, MiniApp};
use miniapp_runtime::testing::MockHost;
use serde_json::Value;

pub const FRAGMENT: &str = "#tgWebAppVersion=7.0&tgWebAppPlatform=tdesktop&tgWebAppThemeParams=%7B%22button_color%22%3A%22%2350a8eb%22%2C%22button_text_color%22%3A%22%23ffffff%22%7D";

pub fn app_with_storage(host: &MockHost, storage: Arc<MemoryStorage>) -> MiniApp {
	MiniApp::init(host, storage, FRAGMENT, BridgeOptions::default()).unwrap()
}

pub fn app(host: &MockHost) -> MiniApp {
	app_with_storage(host, Arc::new(MemoryStorage::new()))
}

/// Data of every outbound event with the given name.
pub fn sent(host: &MockHost, event_type: &str) -> Vec<Value> {
	host.outbound_named(event_type)
		.into_iter()
		.map(|envelope| envelope.event_data)
		.collect()
}

/// Makes the host answer one outbound event with an inbound one.
pub fn answer(host: &MockHost, app: &MiniApp, request: &'static str, reply: &'static str, data: Value) {
	let receiver = app.bridge().receiver();
	host.on_outbound(move |envelope| {
		if envelope.event_type == request {
			receiver.receive(reply, data.clone());
		}
	});
}
