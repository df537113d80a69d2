mod common;

use std::sync::Arc;

use common::{FRAGMENT, app_with_storage};
use miniapp::launch_params::LAUNCH_PARAMS_KEY;
use miniapp::{BridgeOptions, Error, KvStorage, MemoryStorage, MiniApp};
use miniapp_runtime::TransportKind;
use miniapp_runtime::testing::MockHost;

#[test]
fn test_init_without_host_fails() {
	let err = MiniApp::init(
		&MockHost::bare(),
		Arc::new(MemoryStorage::new()),
		FRAGMENT,
		BridgeOptions::default(),
	)
	.err()
	.expect("init should fail");
	let Error::Bridge(inner) = err else {
		panic!("expected a bridge error, got {err:?}");
	};
	assert!(inner.is_fatal());
}

#[test]
fn test_init_exposes_launch_params() {
	let host = MockHost::native();
	let storage = Arc::new(MemoryStorage::new());
	let app = app_with_storage(&host, Arc::clone(&storage));

	assert_eq!(app.version(), Some("7.0"));
	assert_eq!(app.platform(), Some("tdesktop"));
	assert!(app.init_data().is_none());
	assert!(app.init_data_raw().is_none());
	assert!(storage.load(LAUNCH_PARAMS_KEY).is_some());
	assert_eq!(app.bridge().transport_kind(), TransportKind::NativeProxyPostEvent);
}

#[test]
fn test_reload_without_fragment_uses_stored_params() {
	let storage = Arc::new(MemoryStorage::new());
	let host = MockHost::native();
	drop(app_with_storage(&host, Arc::clone(&storage)));

	let reloaded = MiniApp::init(&MockHost::native(), storage, "", BridgeOptions::default()).unwrap();
	assert_eq!(reloaded.version(), Some("7.0"));
	assert_eq!(reloaded.theme().colors().button, "#50a8eb");
}

#[test]
fn test_embedded_init_handshakes_with_parent() {
	let host = MockHost::iframe();
	let app = app_with_storage(&host, Arc::new(MemoryStorage::new()));
	app.ready().unwrap();

	let names: Vec<String> = host.outbound().into_iter().map(|e| e.event_type).collect();
	assert_eq!(names, vec!["iframe_ready", "web_app_ready"]);
	assert_eq!(app.bridge().transport_kind(), TransportKind::ParentWindowPostMessage);
}
