use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::FutureExt;
use miniapp_protocol::{Envelope, IncomingEvent, OutgoingEvent, PopupClosed, VisibilityParams};
use parking_lot::Mutex;
use serde_json::{Value, json};

use super::*;
use crate::error::Error;
use crate::host::{FrameMessage, MessageSource, ReceiverSlot};
use crate::registry::listener;
use crate::testing::{HostCall, MockHost};

fn fixed_ids(id: &'static str) -> Box<dyn RequestIdGenerator> {
	Box::new(move || id.to_string())
}

fn bridge_with_ids(host: &MockHost, id: &'static str) -> Bridge {
	Bridge::with_request_ids(host, BridgeOptions::default(), fixed_ids(id)).unwrap()
}

fn reply(req_id: &str, body: Value) -> Value {
	let mut data = json!({"req_id": req_id});
	if let (Some(map), Value::Object(body)) = (data.as_object_mut(), body) {
		map.extend(body);
	}
	data
}

#[test]
fn test_construction_fails_without_transport() {
	let err = Bridge::new(&MockHost::bare(), BridgeOptions::default()).unwrap_err();
	assert!(matches!(err, Error::TransportUndetectable));
}

#[test]
fn test_post_event_uses_detected_transport() {
	let host = MockHost::external();
	let bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();
	assert_eq!(bridge.transport_kind(), TransportKind::ExternalNotify);

	bridge
		.post_event(&OutgoingEvent::SetupBackButton(VisibilityParams { is_visible: true }))
		.unwrap();

	let sent = host.outbound_named("web_app_setup_back_button");
	assert_eq!(sent.len(), 1);
	assert_eq!(sent[0].event_data, json!({"is_visible": true}));
}

#[test]
fn test_post_event_surfaces_host_failure() {
	let host = MockHost::native();
	let bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();
	host.fail_sends(true);

	let err = bridge.post_event(&OutgoingEvent::WebAppReady).unwrap_err();
	assert!(matches!(err, Error::Host(_)));
}

#[test]
fn test_listeners_fire_in_registration_order() {
	let host = MockHost::native();
	let bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();
	let seen = Arc::new(Mutex::new(Vec::new()));

	let first = {
		let seen = Arc::clone(&seen);
		bridge.on_event(IncomingEvent::PopupClosed, move |data| seen.lock().push(("L1", data.clone())))
	};
	let _second = {
		let seen = Arc::clone(&seen);
		bridge.on_event(IncomingEvent::PopupClosed, move |data| seen.lock().push(("L2", data.clone())))
	};

	bridge.receive_event("popup_closed", json!({"button_id": "ok"}));
	assert_eq!(
		*seen.lock(),
		vec![("L1", json!({"button_id": "ok"})), ("L2", json!({"button_id": "ok"}))]
	);

	seen.lock().clear();
	first.unsubscribe();
	bridge.receive_event("popup_closed", json!({}));
	assert_eq!(*seen.lock(), vec![("L2", json!({}))]);
}

#[test]
fn test_on_event_accumulates_and_add_event_listener_dedups() {
	let host = MockHost::native();
	let bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = {
		let calls = Arc::clone(&calls);
		listener(move |_| {
			calls.fetch_add(1, Ordering::SeqCst);
		})
	};

	assert!(bridge.add_event_listener(IncomingEvent::BackButtonPressed, &counter));
	assert!(!bridge.add_event_listener(IncomingEvent::BackButtonPressed, &counter));
	bridge.receive_event("back_button_pressed", Value::Null);
	assert_eq!(calls.load(Ordering::SeqCst), 1);

	let sub = bridge.subscribe(IncomingEvent::BackButtonPressed, Arc::clone(&counter));
	bridge.receive_event("back_button_pressed", Value::Null);
	assert_eq!(calls.load(Ordering::SeqCst), 3);

	drop(sub);
	assert!(bridge.remove_event_listener(IncomingEvent::BackButtonPressed, &counter));
	assert!(!bridge.remove_event_listener(IncomingEvent::BackButtonPressed, &counter));
	bridge.receive_event("back_button_pressed", Value::Null);
	assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_panicking_listener_does_not_block_others() {
	let host = MockHost::native();
	let bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();
	let calls = Arc::new(AtomicUsize::new(0));

	let _boom = bridge.on_event(IncomingEvent::MainButtonPressed, |_| panic!("listener failure"));
	let _after = {
		let calls = Arc::clone(&calls);
		bridge.on_event(IncomingEvent::MainButtonPressed, move |_| {
			calls.fetch_add(1, Ordering::SeqCst);
		})
	};

	bridge.receive_event("main_button_pressed", Value::Null);
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unknown_event_is_dropped() {
	let host = MockHost::native();
	let bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();
	let calls = Arc::new(AtomicUsize::new(0));
	let _sub = {
		let calls = Arc::clone(&calls);
		bridge.on_event(IncomingEvent::ViewportChanged, move |_| {
			calls.fetch_add(1, Ordering::SeqCst);
		})
	};

	bridge.receive_event("definitely_not_an_event", json!({"x": 1}));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_listener_may_unsubscribe_reentrantly() {
	let host = MockHost::native();
	let bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();
	let calls = Arc::new(AtomicUsize::new(0));
	let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

	let sub = {
		let calls = Arc::clone(&calls);
		let slot = Arc::clone(&slot);
		bridge.on_event(IncomingEvent::SettingsButtonPressed, move |_| {
			calls.fetch_add(1, Ordering::SeqCst);
			slot.lock().take();
		})
	};
	*slot.lock() = Some(sub);

	bridge.receive_event("settings_button_pressed", Value::Null);
	bridge.receive_event("settings_button_pressed", Value::Null);
	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(bridge.listener_count(IncomingEvent::SettingsButtonPressed), 0);
}

#[test]
fn test_typed_listener_skips_bad_payloads() {
	let host = MockHost::native();
	let bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();
	let seen = Arc::new(Mutex::new(Vec::new()));
	let _sub = {
		let seen = Arc::clone(&seen);
		bridge.on_event_typed(IncomingEvent::PopupClosed, move |closed: PopupClosed| {
			seen.lock().push(closed.button_id)
		})
	};

	bridge.receive_event("popup_closed", json!({"button_id": "ok"}));
	bridge.receive_event("popup_closed", json!("not an object"));
	bridge.receive_event("popup_closed", json!({}));
	assert_eq!(*seen.lock(), vec![Some("ok".to_string()), None]);
}

#[tokio::test]
async fn test_custom_method_resolves() {
	let host = MockHost::native();
	let bridge = bridge_with_ids(&host, "R");

	let call = bridge.invoke_custom_method("m", json!({"x": 1})).unwrap();
	assert_eq!(call.req_id(), "R");
	assert_eq!(
		host.outbound(),
		vec![Envelope::new(
			"web_app_invoke_custom_method",
			Some(json!({"req_id": "R", "method": "m", "params": {"x": 1}})),
		)]
	);

	bridge.receive_event("custom_method_invoked", reply("R", json!({"result": "ok"})));
	assert_eq!(call.await.unwrap(), json!("ok"));
	assert_eq!(bridge.pending_requests(), 0);
}

#[tokio::test]
async fn test_custom_method_rejects_with_host_message() {
	let host = MockHost::native();
	let bridge = bridge_with_ids(&host, "R");

	let call = bridge.invoke_custom_method("m", json!({})).unwrap();
	bridge.receive_event("custom_method_invoked", reply("R", json!({"error": "denied"})));

	let err = call.await.unwrap_err();
	assert_eq!(err.remote_message(), Some("denied"));
	assert!(err.to_string().contains("denied"));
}

#[tokio::test]
async fn test_custom_method_empty_error_resolves() {
	let host = MockHost::native();
	let bridge = bridge_with_ids(&host, "R");

	let call = bridge.invoke_custom_method("m", json!({})).unwrap();
	bridge.receive_event("custom_method_invoked", reply("R", json!({"result": "ok", "error": ""})));
	assert_eq!(call.await.unwrap(), json!("ok"));
}

#[tokio::test]
async fn test_custom_method_structured_error_rejects() {
	let host = MockHost::native();
	let bridge = bridge_with_ids(&host, "R");

	let call = bridge.invoke_custom_method("m", json!({})).unwrap();
	bridge.receive_event("custom_method_invoked", reply("R", json!({"error": {"code": 403}})));

	let err = call.await.unwrap_err();
	assert_eq!(err.remote_message(), Some(r#"{"code":403}"#));
	assert_eq!(bridge.pending_requests(), 0);
}

#[test]
fn test_parent_message_with_empty_data_is_dropped() {
	let host = MockHost::iframe();
	let bridge = iframe_bridge(&host);
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&calls);
	let _sub = bridge.on_event(IncomingEvent::ThemeChanged, move |_| {
		counter.fetch_add(1, Ordering::SeqCst);
	});

	host.deliver_frame_message(FrameMessage::from_parent("https://web.telegram.org", ""));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_custom_method_missing_result_is_null() {
	let host = MockHost::native();
	let bridge = bridge_with_ids(&host, "R");

	let call = bridge.invoke_custom_method("m", json!({})).unwrap();
	bridge.receive_event("custom_method_invoked", reply("R", json!({})));
	assert_eq!(call.await.unwrap(), Value::Null);
}

#[tokio::test]
async fn test_duplicate_reply_is_ignored() {
	let host = MockHost::native();
	let bridge = bridge_with_ids(&host, "R");
	let replies = Arc::new(AtomicUsize::new(0));
	let _sub = {
		let replies = Arc::clone(&replies);
		bridge.on_event(IncomingEvent::CustomMethodInvoked, move |_| {
			replies.fetch_add(1, Ordering::SeqCst);
		})
	};

	let call = bridge.invoke_custom_method("m", json!({})).unwrap();
	bridge.receive_event("custom_method_invoked", reply("R", json!({"result": "first"})));
	bridge.receive_event("custom_method_invoked", reply("R", json!({"result": "second"})));

	assert_eq!(call.await.unwrap(), json!("first"));
	// Ordinary listeners still see every reply.
	assert_eq!(replies.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_storage_keys_reply() {
	let host = MockHost::native();
	let bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();
	let receiver = bridge.receiver();
	host.on_outbound(move |envelope| {
		if envelope.event_type != "web_app_invoke_custom_method" {
			return;
		}
		let req_id = envelope.event_data["req_id"].clone();
		assert_eq!(envelope.event_data["method"], "getStorageKeys");
		receiver.receive(
			"custom_method_invoked",
			json!({"req_id": req_id, "result": ["a", "b"]}),
		);
	});

	let keys: Vec<String> = bridge
		.invoke_custom_method("getStorageKeys", json!({}))
		.unwrap()
		.json()
		.await
		.unwrap();
	assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn test_empty_method_name_is_rejected() {
	let host = MockHost::native();
	let bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();

	let err = bridge.invoke_custom_method("", json!({})).unwrap_err();
	assert!(matches!(err, Error::InvalidArgument(_)));
	assert!(host.outbound().is_empty());
	assert_eq!(bridge.pending_requests(), 0);
}

#[test]
fn test_json_reports_unexpected_result_shape() {
	let host = MockHost::native();
	let bridge = bridge_with_ids(&host, "shapeshape000000");
	let receiver = bridge.receiver();
	host.on_outbound(move |_| {
		receiver.receive("custom_method_invoked", reply("shapeshape000000", json!({"result": 42})));
	});

	let call = bridge.invoke_custom_method("getStorageKeys", json!({})).unwrap();
	let err = call.json::<Vec<String>>().now_or_never().unwrap().unwrap_err();
	assert!(matches!(err, Error::Protocol(_)));
}

#[test]
fn test_request_ids_are_alphanumeric() {
	let id = RandomRequestIds.next_id();
	assert_eq!(id.len(), REQUEST_ID_LENGTH);
	assert!(id.bytes().all(|b| REQUEST_ID_ALPHABET.contains(&b)));
}

#[test]
fn test_request_id_exhaustion() {
	let host = MockHost::native();
	let draws = Arc::new(AtomicUsize::new(0));
	let counted = {
		let draws = Arc::clone(&draws);
		move || {
			draws.fetch_add(1, Ordering::SeqCst);
			"same".to_string()
		}
	};
	let bridge = Bridge::with_request_ids(&host, BridgeOptions::default(), Box::new(counted)).unwrap();

	let _first = bridge.invoke_custom_method("m", json!({})).unwrap();
	draws.store(0, Ordering::SeqCst);
	host.clear();

	let err = bridge.invoke_custom_method("m", json!({})).unwrap_err();
	assert!(matches!(err, Error::RequestIdExhausted { attempts: MAX_REQUEST_ID_ATTEMPTS }));
	assert_eq!(draws.load(Ordering::SeqCst), MAX_REQUEST_ID_ATTEMPTS);
	assert!(host.calls().is_empty());
}

#[test]
fn test_dropping_pending_call_removes_entry() {
	let host = MockHost::native();
	let bridge = bridge_with_ids(&host, "R");

	let call = bridge.invoke_custom_method("m", json!({})).unwrap();
	assert_eq!(bridge.pending_requests(), 1);
	drop(call);
	assert_eq!(bridge.pending_requests(), 0);

	// A late reply for the forgotten request is harmless.
	bridge.receive_event("custom_method_invoked", reply("R", json!({"result": 1})));
}

#[test]
fn test_failed_send_does_not_leave_pending_entry() {
	let host = MockHost::native();
	let bridge = bridge_with_ids(&host, "R");
	host.fail_sends(true);

	assert!(bridge.invoke_custom_method("m", json!({})).is_err());
	assert_eq!(bridge.pending_requests(), 0);
}

#[test]
fn test_dropped_bridge_closes_call() {
	let host = MockHost::native();
	let bridge = bridge_with_ids(&host, "R");
	let call = bridge.invoke_custom_method("m", json!({})).unwrap();

	drop(bridge);
	let outcome = call.now_or_never().expect("settled");
	assert!(matches!(outcome, Err(Error::ChannelClosed)));
}

#[test]
fn test_legacy_slots_forward_to_dispatch() {
	let host = MockHost::native();
	let bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();
	let calls = Arc::new(AtomicUsize::new(0));
	let _sub = {
		let calls = Arc::clone(&calls);
		bridge.on_event(IncomingEvent::BackButtonPressed, move |_| {
			calls.fetch_add(1, Ordering::SeqCst);
		})
	};

	for slot in ReceiverSlot::ALL {
		host.receiver(slot).expect("slot installed").receive("back_button_pressed", Value::Null);
	}
	assert_eq!(calls.load(Ordering::SeqCst), ReceiverSlot::ALL.len());
}

#[test]
fn test_legacy_slots_can_be_disabled() {
	let host = MockHost::native();
	let _bridge = Bridge::new(&host, BridgeOptions::default().with_legacy_receivers(false)).unwrap();
	assert!(host.receiver(ReceiverSlot::WebView).is_none());
}

#[test]
fn test_receiver_outliving_bridge_is_inert() {
	let host = MockHost::native();
	let bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();
	let receiver = bridge.receiver();
	assert!(receiver.is_alive());

	drop(bridge);
	assert!(!receiver.is_alive());
	receiver.receive_envelope(Envelope::new("back_button_pressed", None));
}

fn iframe_bridge(host: &MockHost) -> Bridge {
	Bridge::new(host, BridgeOptions::default()).unwrap()
}

fn parent_message(origin: &str, envelope: Value) -> FrameMessage {
	FrameMessage::from_parent(origin, envelope.to_string())
}

#[test]
fn test_iframe_ready_is_first_outbound() {
	let host = MockHost::iframe();
	let bridge = iframe_bridge(&host);
	bridge.post_event(&OutgoingEvent::WebAppReady).unwrap();

	let sent = host.outbound();
	assert_eq!(sent[0].event_type, "iframe_ready");
	assert_eq!(sent[0].event_data, json!({"reload_supported": true}));
	assert_eq!(sent[1].event_type, "web_app_ready");
	assert_eq!(host.frame_listener_count(), 1);
}

#[test]
fn test_iframe_ready_uses_trusted_origin() {
	let host = MockHost::iframe();
	let options = BridgeOptions::default().with_trusted_target_origin("https://web.telegram.org");
	let _bridge = Bridge::new(&host, options).unwrap();

	assert!(matches!(
		&host.calls()[0],
		HostCall::PostMessage { target_origin, .. } if target_origin == "https://web.telegram.org"
	));
}

#[test]
fn test_parent_messages_are_dispatched() {
	let host = MockHost::iframe();
	let bridge = iframe_bridge(&host);
	let seen = Arc::new(Mutex::new(Vec::new()));
	let _sub = {
		let seen = Arc::clone(&seen);
		bridge.on_event(IncomingEvent::ThemeChanged, move |data| seen.lock().push(data.clone()))
	};

	let theme = json!({"eventType": "theme_changed", "eventData": {"theme_params": {"bg_color": "#000"}}});
	host.deliver_frame_message(parent_message("https://anywhere.example", theme.clone()));
	host.deliver_frame_message(FrameMessage {
		source: MessageSource::Other,
		origin: "https://web.telegram.org".into(),
		data: theme.to_string(),
	});
	host.deliver_frame_message(FrameMessage::from_parent("https://web.telegram.org", "not json"));
	host.deliver_frame_message(parent_message("https://web.telegram.org", json!({"eventData": 1})));

	assert_eq!(*seen.lock(), vec![json!({"theme_params": {"bg_color": "#000"}})]);
}

#[test]
fn test_custom_style_requires_trusted_origin() {
	let host = MockHost::iframe();
	let _bridge = iframe_bridge(&host);
	let style = |css: &str| json!({"eventType": "set_custom_style", "eventData": css});

	host.deliver_frame_message(parent_message("https://evil.example", style("body{}")));
	assert_eq!(host.style_elements_created(), 0);

	host.deliver_frame_message(parent_message("https://web.telegram.org", style("a{}")));
	host.deliver_frame_message(parent_message("https://web.telegram.org", style("b{}")));
	assert_eq!(host.style_elements_created(), 1);
	assert_eq!(host.style_content().as_deref(), Some("b{}"));
}

#[test]
fn test_reload_announces_then_reloads() {
	let host = MockHost::iframe();
	let _bridge = iframe_bridge(&host);
	host.clear();

	host.deliver_frame_message(parent_message(
		"https://web.telegram.org",
		json!({"eventType": "reload_iframe", "eventData": null}),
	));

	let calls = host.calls();
	assert_eq!(calls.len(), 2);
	assert_eq!(calls[0].envelope().map(|e| e.event_type).as_deref(), Some("iframe_will_reload"));
	assert_eq!(calls[1], HostCall::Reload);
}

#[test]
fn test_reload_notice_goes_to_parent_when_native_proxy_present() {
	let host = MockHost::native().with_parent_frame();
	let options = BridgeOptions::default().with_trusted_target_origin("https://web.telegram.org");
	let bridge = Bridge::new(&host, options).unwrap();
	assert_eq!(bridge.transport_kind(), TransportKind::NativeProxyPostEvent);
	host.clear();

	host.deliver_frame_message(parent_message(
		"https://web.telegram.org",
		json!({"eventType": "reload_iframe", "eventData": null}),
	));

	let calls = host.calls();
	assert_eq!(calls.len(), 2);
	match &calls[0] {
		HostCall::PostMessage { message, target_origin } => {
			assert_eq!(target_origin, "https://web.telegram.org");
			let envelope = Envelope::from_json(message).unwrap();
			assert_eq!(envelope.event_type, "iframe_will_reload");
		}
		other => panic!("expected postMessage to the parent, got {other:?}"),
	}
	assert_eq!(calls[1], HostCall::Reload);
}

#[test]
fn test_reload_proceeds_when_announce_fails() {
	let host = MockHost::iframe();
	let _bridge = iframe_bridge(&host);
	host.clear();
	host.fail_sends(true);

	host.deliver_frame_message(parent_message(
		"https://web.telegram.org",
		json!({"eventType": "reload_iframe"}),
	));
	assert_eq!(host.reloads(), 1);
}

#[test]
fn test_iframe_setup_failure_is_swallowed() {
	let host = MockHost::iframe();
	host.fail_frame_setup(true);

	let bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();
	assert_eq!(host.frame_listener_count(), 0);
	assert!(host.outbound_named("iframe_ready").is_empty());
	bridge.post_event(&OutgoingEvent::WebAppExpand).unwrap();
}

#[test]
fn test_native_host_skips_iframe_protocol() {
	let host = MockHost::native();
	let _bridge = Bridge::new(&host, BridgeOptions::default()).unwrap();
	assert_eq!(host.frame_listener_count(), 0);
	assert!(host.outbound().is_empty());
}
