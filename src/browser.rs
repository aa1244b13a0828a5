//! web-sys implementations of the `dom` traits and the contact transport.

use std::any::Any;
use std::rc::Rc;

use async_trait::async_trait;
use gloo_net::http::Request;
use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys;
use web_sys::{
    EventTarget, FormData, HtmlButtonElement, HtmlElement, HtmlFormElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, NodeList, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use crate::components::contact_form::{ContactResponse, ContactTransport};
use crate::config::RevealOptions;
use crate::dom::{
    Document, DomEvent, Element, ElementRef, FormElement, IntersectionWatcher, Subscription,
    Viewport,
};
use crate::error::{SiteError, SiteResult};

fn soft<T>(what: &str, result: Result<T, JsValue>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} failed: {}", what, SiteError::dom(e));
            None
        }
    }
}

impl DomEvent for web_sys::Event {
    fn prevent_default(&self) {
        web_sys::Event::prevent_default(self);
    }
}

fn listen(
    target: &EventTarget,
    event: &str,
    mut handler: Box<dyn FnMut(&dyn DomEvent)>,
) -> Subscription {
    let callback = Closure::wrap(Box::new(move |e: web_sys::Event| {
        handler(&e);
    }) as Box<dyn FnMut(web_sys::Event)>);

    let added = target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
    if soft("addEventListener", added).is_none() {
        return Subscription::noop();
    }

    let target = target.clone();
    let event = event.to_string();
    Subscription::new(move || {
        let _ = target.remove_event_listener_with_callback(&event, callback.as_ref().unchecked_ref());
    })
}

#[derive(Clone)]
pub struct BrowserElement(pub HtmlElement);

impl BrowserElement {
    pub fn wrap(node: JsValue) -> Option<ElementRef> {
        node.dyn_into::<HtmlElement>()
            .ok()
            .map(|el| Rc::new(BrowserElement(el)) as ElementRef)
    }
}

impl Element for BrowserElement {
    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn class_tokens(&self) -> Vec<String> {
        self.0
            .class_name()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    fn set_class(&self, class: &str, on: bool) {
        soft("classList.toggle", self.0.class_list().toggle_with_force(class, on));
    }

    fn set_class_name(&self, name: &str) {
        self.0.set_class_name(name);
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn style(&self, property: &str) -> String {
        self.0
            .style()
            .get_property_value(property)
            .unwrap_or_default()
    }

    fn set_style(&self, property: &str, value: &str) {
        soft("style.setProperty", self.0.style().set_property(property, value));
    }

    fn text(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn set_inner_html(&self, html: &str) {
        self.0.set_inner_html(html);
    }

    fn set_disabled(&self, disabled: bool) {
        if let Some(button) = self.0.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
        } else if disabled {
            soft("setAttribute", self.0.set_attribute("disabled", ""));
        } else {
            soft("removeAttribute", self.0.remove_attribute("disabled"));
        }
    }

    fn scroll_into_view(&self) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        self.0.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn is_attached(&self) -> bool {
        self.0.is_connected()
    }

    fn remove(&self) {
        self.0.remove();
    }

    fn on(&self, event: &str, handler: Box<dyn FnMut(&dyn DomEvent)>) -> Subscription {
        listen(&self.0, event, handler)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn collect(list: NodeList) -> Vec<ElementRef> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| BrowserElement::wrap(node.into()))
        .collect()
}

pub struct BrowserForm(pub HtmlFormElement);

impl FormElement for BrowserForm {
    fn fields(&self) -> Vec<(String, String)> {
        let Some(data) = soft("new FormData", FormData::new_with_form(&self.0)) else {
            return Vec::new();
        };
        let Some(Some(entries)) = soft("FormData iterator", js_sys::try_iter(&data)) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let pair = entry.dyn_into::<js_sys::Array>().ok()?;
                // File inputs yield Blobs; only text fields travel.
                Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
            })
            .collect()
    }

    fn reset(&self) {
        self.0.reset();
    }

    fn on_submit(&self, handler: Box<dyn FnMut(&dyn DomEvent)>) -> Subscription {
        listen(&self.0, "submit", handler)
    }
}

#[derive(Clone)]
pub struct BrowserDocument(pub web_sys::Document);

impl BrowserDocument {
    pub fn current() -> Option<Self> {
        web_sys::window()?.document().map(BrowserDocument)
    }

    pub fn query(&self, selector: &str) -> Option<ElementRef> {
        soft("querySelector", self.0.query_selector(selector))
            .flatten()
            .and_then(|el| BrowserElement::wrap(el.into()))
    }

    pub fn query_all(&self, selector: &str) -> Vec<ElementRef> {
        soft("querySelectorAll", self.0.query_selector_all(selector))
            .map(collect)
            .unwrap_or_default()
    }

    /// Matches of `selector` inside `root`.
    pub fn query_within(&self, root: &ElementRef, selector: &str) -> Vec<ElementRef> {
        root.as_any()
            .downcast_ref::<BrowserElement>()
            .and_then(|el| soft("querySelectorAll", el.0.query_selector_all(selector)))
            .map(collect)
            .unwrap_or_default()
    }

    pub fn form(&self, id: &str) -> Option<BrowserForm> {
        self.0
            .get_element_by_id(id)?
            .dyn_into::<HtmlFormElement>()
            .ok()
            .map(BrowserForm)
    }

    pub fn form_submit_button(&self, form: &BrowserForm) -> Option<ElementRef> {
        soft("querySelector", form.0.query_selector("button[type=\"submit\"]"))
            .flatten()
            .and_then(|el| BrowserElement::wrap(el.into()))
    }
}

impl Document for BrowserDocument {
    fn element_by_id(&self, id: &str) -> Option<ElementRef> {
        self.0
            .get_element_by_id(id)
            .and_then(|el| BrowserElement::wrap(el.into()))
    }

    fn create_element(&self, tag: &str) -> Option<ElementRef> {
        soft("createElement", self.0.create_element(tag))
            .and_then(|el| BrowserElement::wrap(el.into()))
    }

    fn append_to_body(&self, element: &dyn Element) {
        let Some(el) = element.as_any().downcast_ref::<BrowserElement>() else {
            return;
        };
        if let Some(body) = self.0.body() {
            soft("appendChild", body.append_child(&el.0));
        }
    }
}

#[derive(Clone)]
pub struct BrowserViewport(pub Window);

impl BrowserViewport {
    pub fn current() -> Option<Self> {
        web_sys::window().map(BrowserViewport)
    }
}

impl Viewport for BrowserViewport {
    fn scroll_y(&self) -> f64 {
        self.0.scroll_y().unwrap_or_default()
    }

    fn inner_width(&self) -> f64 {
        self.0
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or_default()
    }

    fn pathname(&self) -> String {
        self.0.location().pathname().unwrap_or_default()
    }

    fn has_touch_start(&self) -> bool {
        js_sys::Reflect::has(&self.0, &JsValue::from_str("ontouchstart")).unwrap_or(false)
    }

    fn max_touch_points(&self) -> i32 {
        self.0.navigator().max_touch_points()
    }

    fn on_scroll(&self, mut handler: Box<dyn FnMut()>) -> Subscription {
        listen(&self.0, "scroll", Box::new(move |_: &dyn DomEvent| handler()))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserWatcher;

impl IntersectionWatcher for BrowserWatcher {
    fn watch(
        &self,
        targets: &[ElementRef],
        options: &RevealOptions,
        mut on_enter: Box<dyn FnMut(usize)>,
    ) -> Subscription {
        // Position in this list is the key the controller knows the element by.
        let nodes: Vec<Option<web_sys::Element>> = targets
            .iter()
            .map(|t| {
                t.as_any()
                    .downcast_ref::<BrowserElement>()
                    .map(|el| el.0.clone().into())
            })
            .collect();
        let lookup = nodes.clone();

        let callback = Closure::wrap(Box::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    if !entry.is_intersecting() {
                        continue;
                    }
                    let target = entry.target();
                    if let Some(index) = lookup.iter().position(|n| n.as_ref() == Some(&target)) {
                        on_enter(index);
                    }
                }
            },
        ) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);
        let Some(observer) = soft(
            "IntersectionObserver",
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init),
        ) else {
            return Subscription::noop();
        };

        for node in nodes.iter().flatten() {
            observer.observe(node);
        }

        Subscription::new(move || {
            observer.disconnect();
            drop(callback);
        })
    }
}

/// Posts the form to the site's own backend with gloo-net.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

#[async_trait(?Send)]
impl ContactTransport for BrowserTransport {
    async fn submit(&self, endpoint: &str, fields: Vec<(String, String)>) -> SiteResult<ContactResponse> {
        let body = FormData::new().map_err(SiteError::dom)?;
        for (name, value) in &fields {
            body.append_with_str(name, value).map_err(SiteError::dom)?;
        }

        let response = Request::post(endpoint).body(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok(ContactResponse { status, body: text })
    }
}
