//! The slice of the page the controllers touch.
//!
//! Every controller receives its elements as trait objects, so the same code
//! drives the live document (see `browser`) and the in-memory fakes used by
//! the unit tests.

use std::any::Any;
use std::rc::Rc;

use crate::config::RevealOptions;

pub type ElementRef = Rc<dyn Element>;

/// Something a listener can cancel the default action of.
pub trait DomEvent {
    fn prevent_default(&self);
}

pub trait Element {
    fn has_class(&self, class: &str) -> bool;
    fn class_tokens(&self) -> Vec<String>;
    fn set_class(&self, class: &str, on: bool);
    fn set_class_name(&self, name: &str);
    fn attribute(&self, name: &str) -> Option<String>;
    fn style(&self, property: &str) -> String;
    fn set_style(&self, property: &str, value: &str);
    fn text(&self) -> String;
    fn set_text(&self, text: &str);
    fn set_inner_html(&self, html: &str);
    fn set_disabled(&self, disabled: bool);
    /// Smooth scroll so the element's top edge meets the viewport top.
    fn scroll_into_view(&self);
    fn is_attached(&self) -> bool;
    /// Detach from the parent. Detached elements are left alone.
    fn remove(&self);
    fn on(&self, event: &str, handler: Box<dyn FnMut(&dyn DomEvent)>) -> Subscription;
    fn as_any(&self) -> &dyn Any;
}

pub trait FormElement {
    /// Name/value pairs in document order.
    fn fields(&self) -> Vec<(String, String)>;
    fn reset(&self);
    fn on_submit(&self, handler: Box<dyn FnMut(&dyn DomEvent)>) -> Subscription;
}

pub trait Document {
    fn element_by_id(&self, id: &str) -> Option<ElementRef>;
    /// A new, detached element.
    fn create_element(&self, tag: &str) -> Option<ElementRef>;
    fn append_to_body(&self, element: &dyn Element);
}

pub trait Viewport {
    fn scroll_y(&self) -> f64;
    fn inner_width(&self) -> f64;
    fn pathname(&self) -> String;
    fn has_touch_start(&self) -> bool;
    fn max_touch_points(&self) -> i32;
    fn on_scroll(&self, handler: Box<dyn FnMut()>) -> Subscription;
}

/// Reports targets (by their index in `targets`) as they enter the viewport.
pub trait IntersectionWatcher {
    fn watch(
        &self,
        targets: &[ElementRef],
        options: &RevealOptions,
        on_enter: Box<dyn FnMut(usize)>,
    ) -> Subscription;
}

/// Removes a listener when disposed or dropped.
#[must_use = "dropping a Subscription removes its listener"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn noop() -> Self {
        Self { teardown: None }
    }

    pub fn dispose(mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }

    /// Keep the listener for the rest of the page's life.
    pub fn forget(mut self) {
        if let Some(teardown) = self.teardown.take() {
            std::mem::forget(teardown);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

/// All the listeners one controller registered.
#[must_use = "dropping Bindings removes every listener they hold"]
#[derive(Default)]
pub struct Bindings {
    subscriptions: Vec<Subscription>,
}

impl Bindings {
    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn merge(&mut self, other: Bindings) {
        let mut other = other;
        self.subscriptions.append(&mut other.subscriptions);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn dispose(self) {
        for subscription in self.subscriptions {
            subscription.dispose();
        }
    }

    pub fn forget(self) {
        for subscription in self.subscriptions {
            subscription.forget();
        }
    }
}
