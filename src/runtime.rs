use std::future::Future;
use std::pin::Pin;

use gloo_timers::callback::Timeout;
use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

pub type TimerId = i32;
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Timers, frames and local futures: the only ways work gets deferred.
pub trait EventLoop {
    fn set_timeout(&self, millis: u32, task: Box<dyn FnOnce()>) -> TimerId;
    /// Unknown or already-fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);
    /// Run `task` before the next repaint.
    fn request_frame(&self, task: Box<dyn FnOnce()>);
    fn spawn(&self, task: LocalTask);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserLoop;

impl EventLoop for BrowserLoop {
    fn set_timeout(&self, millis: u32, task: Box<dyn FnOnce()>) -> TimerId {
        let id = Timeout::new(millis, task).forget();
        id.as_f64().map(|id| id as TimerId).unwrap_or_default()
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(id);
        }
    }

    fn request_frame(&self, task: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = Closure::once_into_js(move |_timestamp: f64| task());
        if let Err(e) = window.request_animation_frame(callback.unchecked_ref()) {
            warn!("requestAnimationFrame failed: {:?}", e);
        }
    }

    fn spawn(&self, task: LocalTask) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
