//! Browser entry point for Mini Apps built with the Rust SDK.
//!
//! Load the generated module in the page and the SDK connects to whichever
//! host mechanism the client injected, announces readiness, and keeps the
//! app alive for the page's lifetime.

mod host;
mod storage;

use std::cell::RefCell;
use std::sync::Arc;

use miniapp::{BridgeOptions, MiniApp};
use wasm_bindgen::prelude::*;

pub use host::WindowHost;
pub use storage::SessionStorage;

thread_local! {
    static APP: RefCell<Option<MiniApp>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    if let Err(err) = init() {
        web_sys::console::error_1(&err);
        return Err(err);
    }
    Ok(())
}

fn init() -> Result<(), JsValue> {
    let fragment = host::window().map_err(to_js_error)?.location().hash()?;
    let app = MiniApp::init(
        &WindowHost,
        Arc::new(SessionStorage),
        &fragment,
        BridgeOptions::default(),
    )
    .map_err(to_js_error)?;
    app.ready().map_err(to_js_error)?;
    APP.with(|slot| *slot.borrow_mut() = Some(app));
    Ok(())
}

/// Launch parameters the page was opened with.
#[wasm_bindgen(js_name = launchParams)]
pub fn launch_params() -> Result<JsValue, JsValue> {
    with_app(|app| serde_wasm_bindgen::to_value(app.launch_params()).map_err(Into::into))
}

#[wasm_bindgen]
pub fn expand() -> Result<(), JsValue> {
    with_app(|app| app.expand().map_err(to_js_error))
}

#[wasm_bindgen]
pub fn close() -> Result<(), JsValue> {
    with_app(|app| app.close().map_err(to_js_error))
}

fn with_app<T>(f: impl FnOnce(&MiniApp) -> Result<T, JsValue>) -> Result<T, JsValue> {
    APP.with(|slot| match slot.borrow().as_ref() {
        Some(app) => f(app),
        None => Err(JsValue::from_str("mini app is not initialized")),
    })
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
