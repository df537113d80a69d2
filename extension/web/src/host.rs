//! Host capabilities backed by `window`.
//!
//! Every handle is zero-sized and looks the global up again on each call,
//! so nothing JS-owned is held across calls and the handles stay `Send`.

use std::sync::Arc;

use js_sys::{Function, Object, Reflect};
use miniapp_runtime::{
    Error, EventReceiver, ExternalNotifier, FrameMessage, FrameMessageListener, HostEnvironment,
    MessageSource, ParentFrame, ReceiverSlot, Result, StyleElement, WebViewProxy,
};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MessageEvent, Window};

const STYLE_ELEMENT_ID: &str = "miniapp-custom-styles";

/// The page's `window`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowHost;

impl HostEnvironment for WindowHost {
    fn webview_proxy(&self) -> Option<Arc<dyn WebViewProxy>> {
        method_of("TelegramWebviewProxy", "postEvent")
            .ok()
            .map(|_| Arc::new(WindowWebViewProxy) as Arc<dyn WebViewProxy>)
    }

    fn external_notifier(&self) -> Option<Arc<dyn ExternalNotifier>> {
        method_of("external", "notify")
            .ok()
            .map(|_| Arc::new(WindowExternal) as Arc<dyn ExternalNotifier>)
    }

    fn parent_frame(&self) -> Option<Arc<dyn ParentFrame>> {
        let window = window().ok()?;
        let top = window.top().ok().flatten()?;
        if Object::is(&window, &top) {
            return None;
        }
        Some(Arc::new(WindowParent))
    }

    fn install_receiver(&self, slot: ReceiverSlot, receiver: EventReceiver) -> Result<()> {
        let callback = Closure::<dyn Fn(JsValue, JsValue)>::new(move |event_type: JsValue, event_data: JsValue| {
            let Some(event_type) = event_type.as_string() else {
                return;
            };
            let event_data = if event_data.is_undefined() || event_data.is_null() {
                Value::Null
            } else {
                serde_wasm_bindgen::from_value(event_data).unwrap_or(Value::Null)
            };
            receiver.receive(&event_type, event_data);
        });

        let mut target: JsValue = window()?.into();
        let mut path = slot.global_path().split('.').peekable();
        while let Some(name) = path.next() {
            let key = JsValue::from_str(name);
            if path.peek().is_none() {
                Reflect::set(&target, &key, callback.as_ref()).map_err(host_error)?;
                break;
            }
            let mut next = Reflect::get(&target, &key).map_err(host_error)?;
            if !next.is_object() {
                next = Object::new().into();
                Reflect::set(&target, &key, &next).map_err(host_error)?;
            }
            target = next;
        }
        // The slot lives as long as the page.
        callback.forget();
        Ok(())
    }
}

struct WindowWebViewProxy;

impl WebViewProxy for WindowWebViewProxy {
    fn post_event(&self, event_type: &str, event_data: &str) -> Result<()> {
        let (proxy, post_event) = method_of("TelegramWebviewProxy", "postEvent")?;
        post_event
            .call2(&proxy, &JsValue::from_str(event_type), &JsValue::from_str(event_data))
            .map(drop)
            .map_err(host_error)
    }
}

struct WindowExternal;

impl ExternalNotifier for WindowExternal {
    fn notify(&self, message: &str) -> Result<()> {
        let (external, notify) = method_of("external", "notify")?;
        notify
            .call1(&external, &JsValue::from_str(message))
            .map(drop)
            .map_err(host_error)
    }
}

struct WindowParent;

impl ParentFrame for WindowParent {
    fn post_message(&self, message: &str, target_origin: &str) -> Result<()> {
        let parent = window()?
            .parent()
            .map_err(host_error)?
            .ok_or_else(|| Error::Host("window.parent is not available".to_string()))?;
        parent
            .post_message(&JsValue::from_str(message), target_origin)
            .map_err(host_error)
    }

    fn add_message_listener(&self, listener: FrameMessageListener) -> Result<()> {
        let window = window()?;
        let callback = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            listener(frame_message(&event));
        });
        window
            .add_event_listener_with_callback("message", callback.as_ref().unchecked_ref())
            .map_err(host_error)?;
        callback.forget();
        Ok(())
    }

    fn create_style_element(&self) -> Result<Box<dyn StyleElement>> {
        let document = window()?
            .document()
            .ok_or_else(|| Error::Host("no document".to_string()))?;
        let head = document
            .head()
            .ok_or_else(|| Error::Host("document has no head".to_string()))?;
        let style = document.create_element("style").map_err(host_error)?;
        style.set_id(STYLE_ELEMENT_ID);
        head.append_child(&style).map_err(host_error)?;
        Ok(Box::new(WindowStyle))
    }

    fn reload(&self) {
        if let Ok(window) = window() {
            let _ = window.location().reload();
        }
    }
}

struct WindowStyle;

impl StyleElement for WindowStyle {
    fn set_content(&self, css: &str) {
        let element = window()
            .ok()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(STYLE_ELEMENT_ID));
        if let Some(element) = element {
            element.set_text_content(Some(css));
        }
    }
}

fn frame_message(event: &MessageEvent) -> FrameMessage {
    let parent = window().ok().and_then(|window| window.parent().ok().flatten());
    let source = match (event.source(), parent) {
        (Some(source), Some(parent)) if Object::is(&source, &parent) => MessageSource::Parent,
        _ => MessageSource::Other,
    };

    // Only JSON text is an envelope. Structured-clone objects are left
    // empty so decoding drops them.
    let data = event.data().as_string().unwrap_or_default();

    FrameMessage {
        source,
        origin: event.origin(),
        data,
    }
}

pub(crate) fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| Error::Host("no global window".to_string()))
}

/// `window[object][method]`, if it is callable.
fn method_of(object: &str, method: &str) -> Result<(JsValue, Function)> {
    let window: Window = window()?;
    let owner = Reflect::get(&window, &JsValue::from_str(object)).map_err(host_error)?;
    if !owner.is_object() {
        return Err(Error::Host(format!("window.{object} is not available")));
    }
    let function = Reflect::get(&owner, &JsValue::from_str(method))
        .map_err(host_error)?
        .dyn_into::<Function>()
        .map_err(|_| Error::Host(format!("window.{object}.{method} is not a function")))?;
    Ok((owner, function))
}

pub(crate) fn host_error(err: JsValue) -> Error {
    Error::Host(stringify_js_error(err))
}

pub(crate) fn stringify_js_error(err: JsValue) -> String {
    err.as_string()
        .or_else(|| js_sys::JSON::stringify(&err).ok()?.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}
