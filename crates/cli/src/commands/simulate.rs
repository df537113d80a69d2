//! `miniapp simulate`: a scripted Mini App session against an in-process host.
//!
//! The simulated host answers what a real client would: popups close on
//! their first button, the viewport expands, permission requests are
//! granted, and cloud storage methods are served from memory. Everything
//! the page sends is collected in the [`SimulationReport`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use miniapp::protocol::{Envelope, ImpactStyle};
use miniapp::{MemoryStorage, MiniApp};
use miniapp_runtime::testing::MockHost;
use miniapp_runtime::{BridgeOptions, EventReceiver, FrameMessage, TRUSTED_STYLE_ORIGIN, TransportKind};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::TransportArg;
use crate::error::Result;

/// Launch fragment used when none is given: a desktop client with a dark theme.
pub const DEFAULT_FRAGMENT: &str = "tgWebAppVersion=7.0&tgWebAppPlatform=tdesktop&tgWebAppThemeParams=%7B%22bg_color%22%3A%22%2317212b%22%2C%22text_color%22%3A%22%23f5f5f5%22%2C%22button_color%22%3A%22%235288c1%22%2C%22button_text_color%22%3A%22%23ffffff%22%7D";

const GREETING_KEY: &str = "greeting";
const GREETING: &str = "hello from the simulator";
const SIMULATED_CSS: &str = "body { background: var(--tg-theme-bg-color); }";

type CloudStore = Arc<Mutex<BTreeMap<String, String>>>;

/// What happened during a simulated session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
	pub transport: TransportKind,
	pub version: Option<String>,
	pub main_button_clicks: usize,
	pub back_button_clicks: usize,
	pub expanded: bool,
	pub confirmed: bool,
	pub write_access: bool,
	pub greeting: Option<String>,
	pub cloud_keys: Vec<String>,
	pub custom_style: Option<String>,
	/// Every envelope the page sent, in order.
	pub outbound: Vec<Envelope>,
}

/// A [`MockHost`] that plays the client's side of the conversation.
pub struct SimulatedHost {
	host: MockHost,
	transport: TransportArg,
	cloud: CloudStore,
}

impl SimulatedHost {
	pub fn new(transport: TransportArg) -> Self {
		let host = match transport {
			TransportArg::Native => MockHost::native(),
			TransportArg::External => MockHost::external(),
			TransportArg::Iframe => MockHost::iframe(),
		};
		Self {
			host,
			transport,
			cloud: CloudStore::default(),
		}
	}

	pub fn host(&self) -> &MockHost {
		&self.host
	}

	/// Starts answering the page's requests through `receiver`.
	pub fn serve(&self, receiver: EventReceiver) {
		let cloud = Arc::clone(&self.cloud);
		let host = self.host.clone();
		let transport = self.transport;
		self.host.on_outbound(move |envelope| {
			if let Some((event_type, event_data)) = reply(&cloud, envelope) {
				deliver(&host, transport, &receiver, Envelope::new(event_type, Some(event_data)));
			}
		});
	}

	/// Sends an unsolicited event to the page, as if the user acted in the client.
	pub fn emit(&self, receiver: &EventReceiver, event_type: &str, event_data: Value) {
		deliver(&self.host, self.transport, receiver, Envelope::new(event_type, Some(event_data)));
	}
}

impl Drop for SimulatedHost {
	fn drop(&mut self) {
		// The hook holds a clone of the host.
		self.host.clear_outbound_hook();
	}
}

/// Embedded pages hear from the client through frame messages; the other
/// transports call the page's receiver directly.
fn deliver(host: &MockHost, transport: TransportArg, receiver: &EventReceiver, envelope: Envelope) {
	if transport != TransportArg::Iframe {
		receiver.receive_envelope(envelope);
		return;
	}
	match envelope.to_json() {
		Ok(json) => host.deliver_frame_message(FrameMessage::from_parent(TRUSTED_STYLE_ORIGIN, json)),
		Err(err) => tracing::warn!(%err, event_type = %envelope.event_type, "cannot encode simulated reply"),
	}
}

/// The client's answer to an outbound envelope, if it has one.
fn reply(cloud: &CloudStore, envelope: &Envelope) -> Option<(&'static str, Value)> {
	let data = &envelope.event_data;
	let answer = match envelope.event_type.as_str() {
		"web_app_expand" => (
			"viewport_changed",
			json!({"height": 720, "is_state_stable": true, "is_expanded": true}),
		),
		"web_app_request_viewport" => (
			"viewport_changed",
			json!({"height": 480, "is_state_stable": true, "is_expanded": false}),
		),
		"web_app_open_popup" => {
			let button_id = data["buttons"]
				.as_array()
				.and_then(|buttons| buttons.first())
				.and_then(|button| button["id"].as_str());
			("popup_closed", json!({"button_id": button_id}))
		}
		"web_app_request_write_access" => ("write_access_requested", json!({"status": "allowed"})),
		"web_app_request_phone" => ("phone_requested", json!({"status": "sent"})),
		"web_app_invoke_custom_method" => ("custom_method_invoked", invoke_custom_method(cloud, data)),
		_ => return None,
	};
	tracing::debug!(request = %envelope.event_type, reply = answer.0, "simulated host replied");
	Some(answer)
}

fn invoke_custom_method(cloud: &CloudStore, data: &Value) -> Value {
	let req_id = &data["req_id"];
	let params = &data["params"];
	let keys = || {
		params["keys"]
			.as_array()
			.into_iter()
			.flatten()
			.filter_map(Value::as_str)
	};

	let mut store = cloud.lock();
	let result = match data["method"].as_str() {
		Some("saveStorageValue") => match (params["key"].as_str(), params["value"].as_str()) {
			(Some(key), Some(value)) => {
				store.insert(key.to_string(), value.to_string());
				json!(true)
			}
			_ => return json!({"req_id": req_id, "error": "key and value are required"}),
		},
		Some("getStorageValues") => Value::Object(
			keys()
				.filter_map(|key| store.get(key).map(|value| (key.to_string(), json!(value))))
				.collect(),
		),
		Some("deleteStorageValues") => {
			for key in keys() {
				store.remove(key);
			}
			json!(true)
		}
		Some("getStorageKeys") => json!(store.keys().collect::<Vec<_>>()),
		other => {
			let method = other.unwrap_or("<missing>");
			return json!({"req_id": req_id, "error": format!("unsupported method {method}")});
		}
	};
	json!({"req_id": req_id, "result": result})
}

/// Runs the scripted session and reports what the page did.
pub async fn execute(transport: TransportArg, target_origin: Option<String>, fragment: &str) -> Result<SimulationReport> {
	let simulated = SimulatedHost::new(transport);
	let mut options = BridgeOptions::default();
	if let Some(origin) = target_origin {
		options = options.with_trusted_target_origin(origin);
	}

	let app = MiniApp::init(simulated.host(), Arc::new(MemoryStorage::new()), fragment, options)?;
	let receiver = app.bridge().receiver();
	simulated.serve(receiver.clone());
	tracing::info!(transport = %app.bridge().transport_kind(), "simulated host connected");

	if transport == TransportArg::Iframe {
		simulated.emit(&receiver, "set_custom_style", json!(SIMULATED_CSS));
	}

	app.ready()?;
	app.expand()?;

	let main_clicks = Arc::new(AtomicUsize::new(0));
	let _main_click = {
		let clicks = Arc::clone(&main_clicks);
		app.main_button().on_click(move || {
			clicks.fetch_add(1, Ordering::SeqCst);
		})
	};
	app.main_button().set_text("Save greeting")?;
	app.main_button().show()?;
	simulated.emit(&receiver, "main_button_pressed", Value::Null);

	let back_clicks = Arc::new(AtomicUsize::new(0));
	let _back_click = {
		let clicks = Arc::clone(&back_clicks);
		app.back_button().on_click(move || {
			clicks.fetch_add(1, Ordering::SeqCst);
		})
	};
	app.back_button().show()?;
	app.settings_button().show()?;
	simulated.emit(&receiver, "back_button_pressed", Value::Null);

	app.closing_behavior().enable_confirmation()?;
	app.haptics().impact_occurred(ImpactStyle::Medium)?;

	let confirmed = app.popups().confirm("Store the greeting in cloud storage?").await?;
	let mut greeting = None;
	if confirmed {
		app.main_button().start_loading()?;
		app.cloud_storage().set_item(GREETING_KEY, GREETING).await?;
		greeting = app.cloud_storage().get_item(GREETING_KEY).await?;
		app.main_button().stop_loading()?;
	}
	let cloud_keys = app.cloud_storage().get_keys().await?;
	let write_access = app.permissions().request_write_access().await?;

	app.main_button().hide()?;
	app.back_button().hide()?;
	app.close()?;

	Ok(SimulationReport {
		transport: app.bridge().transport_kind(),
		version: app.version().map(str::to_string),
		main_button_clicks: main_clicks.load(Ordering::SeqCst),
		back_button_clicks: back_clicks.load(Ordering::SeqCst),
		expanded: app.viewport().is_expanded(),
		confirmed,
		write_access,
		greeting,
		cloud_keys,
		custom_style: simulated.host().style_content(),
		outbound: simulated.host().outbound(),
	})
}
