use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::warn;

use crate::config::NotificationConfig;
use crate::dom::{Document, DomEvent, ElementRef, Subscription};
use crate::runtime::EventLoop;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    #[default]
    Info,
}

impl NotificationKind {
    /// Unknown names fall back to `Info`.
    pub fn parse(name: &str) -> Self {
        match name {
            "success" => NotificationKind::Success,
            "error" => NotificationKind::Error,
            _ => NotificationKind::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        }
    }

    pub fn background(self) -> &'static str {
        match self {
            NotificationKind::Success => "var(--success-color)",
            NotificationKind::Error => "var(--error-color)",
            NotificationKind::Info => "var(--primary-color)",
        }
    }
}

const TOAST_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("top", "20px"),
    ("right", "20px"),
    ("padding", "1rem 1.5rem"),
    ("border-radius", "var(--radius-lg)"),
    ("color", "white"),
    ("font-weight", "500"),
    ("z-index", "9999"),
    ("opacity", "0"),
    ("transform", "translateX(100%)"),
    ("transition", "all 0.3s ease-out"),
];

/// Creates toasts. Every toast manages its own lifetime; nothing is shared
/// between them, so concurrent toasts overlap.
#[derive(Clone)]
pub struct Notifier {
    document: Rc<dyn Document>,
    event_loop: Rc<dyn EventLoop>,
    config: NotificationConfig,
}

impl Notifier {
    pub fn new(
        document: Rc<dyn Document>,
        event_loop: Rc<dyn EventLoop>,
        config: NotificationConfig,
    ) -> Self {
        Self {
            document,
            event_loop,
            config,
        }
    }

    pub fn show(&self, message: &str, kind: NotificationKind) -> Option<Toast> {
        let Some(element) = self.document.create_element("div") else {
            warn!("could not create notification for: {}", message);
            return None;
        };
        element.set_class_name(&format!("notification notification-{}", kind.as_str()));
        element.set_text(message);
        for (property, value) in TOAST_STYLE {
            element.set_style(property, value);
        }
        element.set_style("background", kind.background());

        self.document.append_to_body(&*element);

        let inner = Rc::new(ToastInner {
            element,
            event_loop: self.event_loop.clone(),
            fade_ms: self.config.fade_ms,
            dismissing: Cell::new(false),
            click: RefCell::new(None),
        });

        let shown = inner.element.clone();
        self.event_loop.request_frame(Box::new(move || {
            shown.set_style("opacity", "1");
            shown.set_style("transform", "translateX(0)");
        }));

        let auto = inner.clone();
        self.event_loop
            .set_timeout(self.config.display_ms, Box::new(move || auto.dismiss()));

        let clicked = inner.clone();
        let click = inner
            .element
            .on("click", Box::new(move |_: &dyn DomEvent| clicked.dismiss()));
        *inner.click.borrow_mut() = Some(click);

        Some(Toast { inner })
    }
}

#[derive(Clone)]
pub struct Toast {
    inner: Rc<ToastInner>,
}

impl Toast {
    pub fn element(&self) -> &ElementRef {
        &self.inner.element
    }

    /// Hide now and detach once the fade is over.
    pub fn dismiss(&self) {
        self.inner.dismiss();
    }
}

struct ToastInner {
    element: ElementRef,
    event_loop: Rc<dyn EventLoop>,
    fade_ms: u32,
    dismissing: Cell<bool>,
    click: RefCell<Option<Subscription>>,
}

impl ToastInner {
    fn dismiss(self: &Rc<Self>) {
        if self.dismissing.replace(true) || !self.element.is_attached() {
            return;
        }
        self.element.set_style("opacity", "0");
        self.element.set_style("transform", "translateX(100%)");

        let inner = self.clone();
        self.event_loop
            .set_timeout(self.fade_ms, Box::new(move || inner.remove()));
    }

    fn remove(&self) {
        if self.element.is_attached() {
            self.element.remove();
        }
        // Releases the click handler, which holds the last strong reference.
        let click = self.click.borrow_mut().take();
        drop(click);
    }
}
