use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::browser::{BrowserDocument, BrowserTransport, BrowserViewport, BrowserWatcher};
use crate::components::animation::Animations;
use crate::components::contact_form::ContactForm;
use crate::components::navigation::{NavElements, Navigation};
use crate::components::notification::Notifier;
use crate::components::scroll_effects::ScrollEffects;
use crate::config::{NotificationConfig, SiteConfig};
use crate::dom::{Bindings, Document, Viewport};
use crate::runtime::{BrowserLoop, EventLoop};

/// Boots once the DOM is parsed; right away if it already is.
pub fn start(config: SiteConfig) {
    let Some(document) = BrowserDocument::current() else {
        warn!("no document, site scripts not started");
        return;
    };
    if is_parsed(&document.0.ready_state()) {
        boot(config).forget();
        return;
    }

    let ready = Closure::once(move || boot(config).forget());
    if let Err(e) = document
        .0
        .add_event_listener_with_callback("DOMContentLoaded", ready.as_ref().unchecked_ref())
    {
        warn!("could not wait for DOMContentLoaded: {:?}", e);
        return;
    }
    ready.forget();
}

/// `document.readyState` is past "loading".
fn is_parsed(ready_state: &str) -> bool {
    ready_state != "loading"
}

/// Wires every controller to the live page.
pub fn boot(config: SiteConfig) -> Bindings {
    let mut bindings = Bindings::default();
    let (Some(page), Some(viewport)) = (BrowserDocument::current(), BrowserViewport::current())
    else {
        warn!("no window, site scripts not started");
        return bindings;
    };
    let viewport: Rc<dyn Viewport> = Rc::new(viewport);
    let event_loop: Rc<dyn EventLoop> = Rc::new(BrowserLoop);

    bindings.merge(init_navigation(&page, viewport.clone(), &config));
    bindings.merge(init_animations(&page, event_loop.clone(), &config));
    bindings.merge(init_scroll_effects(&page, viewport, &config));
    bindings.merge(init_contact_form(&page, event_loop, &config));

    info!("site scripts ready ({} listeners)", bindings.len());
    bindings
}

fn init_navigation(page: &BrowserDocument, viewport: Rc<dyn Viewport>, config: &SiteConfig) -> Bindings {
    let menu = page.element_by_id("nav-menu");
    let menu_links = menu
        .as_ref()
        .map(|m| page.query_within(m, ".nav-link"))
        .unwrap_or_default();
    let elements = NavElements {
        toggle: page.element_by_id("nav-toggle"),
        menu,
        navbar: page.query(".navbar"),
        menu_links,
        links: page.query_all(".nav-link"),
    };
    Navigation::new(elements, viewport, config.navigation.clone()).bind()
}

fn init_animations(page: &BrowserDocument, event_loop: Rc<dyn EventLoop>, config: &SiteConfig) -> Bindings {
    Animations::new(
        page.query_all("[class*=\"animate-\"]"),
        Rc::new(BrowserWatcher),
        event_loop,
        config.reveal.clone(),
    )
    .bind()
}

fn init_scroll_effects(page: &BrowserDocument, viewport: Rc<dyn Viewport>, config: &SiteConfig) -> Bindings {
    ScrollEffects::new(
        page.query_all("a[href^=\"#\"]"),
        page.query(".hero"),
        Rc::new(page.clone()),
        viewport,
        config.parallax_factor,
    )
    .bind()
}

fn init_contact_form(page: &BrowserDocument, event_loop: Rc<dyn EventLoop>, config: &SiteConfig) -> Bindings {
    let Some(form) = page.form("contact-form") else {
        debug!("no contact form on this page");
        return Bindings::default();
    };
    let submit_button = page.form_submit_button(&form);
    let notifier = Notifier::new(
        Rc::new(page.clone()),
        event_loop.clone(),
        config.notifications.clone(),
    );
    ContactForm::new(
        Rc::new(form),
        submit_button,
        BrowserTransport,
        notifier,
        event_loop,
        config.contact_endpoint.clone(),
        config.messages.clone(),
    )
    .bind()
}

/// A notifier for the live page, for callers outside the controllers.
pub fn browser_notifier(config: NotificationConfig) -> Option<Notifier> {
    let page: Rc<dyn Document> = Rc::new(BrowserDocument::current()?);
    Some(Notifier::new(page, Rc::new(BrowserLoop), config))
}
