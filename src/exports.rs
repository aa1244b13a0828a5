//! Functions other scripts on the site can import from the wasm module.

use std::rc::Rc;

use log::error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::js_sys;

use crate::browser::BrowserViewport;
use crate::components::notification::NotificationKind;
use crate::config::NotificationConfig;
use crate::page;
use crate::runtime::BrowserLoop;
use crate::utils;

#[wasm_bindgen(js_name = showNotification)]
pub fn show_notification(message: &str, kind: Option<String>) {
    let kind = kind
        .as_deref()
        .map(NotificationKind::parse)
        .unwrap_or_default();
    if let Some(notifier) = page::browser_notifier(NotificationConfig::default()) {
        notifier.show(message, kind);
    }
}

#[wasm_bindgen(js_name = isMobile)]
pub fn is_mobile() -> bool {
    BrowserViewport::current()
        .map(|viewport| utils::is_mobile(&viewport))
        .unwrap_or(false)
}

#[wasm_bindgen(js_name = isTouchDevice)]
pub fn is_touch_device() -> bool {
    BrowserViewport::current()
        .map(|viewport| utils::is_touch_device(&viewport))
        .unwrap_or(false)
}

/// The receiver and arguments of one JS call.
type JsCall = (JsValue, js_sys::Array);

fn forward(func: js_sys::Function) -> impl FnMut(JsCall) + 'static {
    move |(this, args): JsCall| {
        if let Err(e) = func.apply(&this, &args) {
            error!("wrapped function threw: {:?}", e);
        }
    }
}

/// A plain JS function that hands its `this` and all its arguments to
/// `handler`.
fn variadic(mut handler: impl FnMut(JsCall) + 'static) -> Result<js_sys::Function, JsValue> {
    let handler = Closure::<dyn FnMut(JsValue, js_sys::Array)>::new(
        move |this: JsValue, args: js_sys::Array| handler((this, args)),
    )
    .into_js_value();
    let trampoline = js_sys::Function::new_with_args(
        "handler",
        "return function (...args) { handler(this, args); };",
    );
    Ok(trampoline.call1(&JsValue::NULL, &handler)?.unchecked_into())
}

/// Wraps `func` so it runs `wait` ms after the last call, with that call's
/// `this` and arguments.
#[wasm_bindgen]
pub fn debounce(func: js_sys::Function, wait: u32) -> Result<js_sys::Function, JsValue> {
    let debounced = utils::debounce(Rc::new(BrowserLoop), wait, forward(func));
    variadic(move |call| debounced.call(call))
}

/// Wraps `func` so it runs at most once per `limit` ms, on the leading edge.
#[wasm_bindgen]
pub fn throttle(func: js_sys::Function, limit: u32) -> Result<js_sys::Function, JsValue> {
    let throttled = utils::throttle(Rc::new(BrowserLoop), limit, forward(func));
    variadic(move |call| {
        throttled.call(call);
    })
}
