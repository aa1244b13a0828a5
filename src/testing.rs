//! In-memory stand-ins for the page, the event loop and the contact endpoint.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;

use crate::components::contact_form::{ContactResponse, ContactTransport};
use crate::config::RevealOptions;
use crate::dom::{
    Document, DomEvent, Element, ElementRef, FormElement, IntersectionWatcher, Subscription,
    Viewport,
};
use crate::error::{SiteError, SiteResult};
use crate::runtime::{EventLoop, LocalTask, TimerId};

type Handler = Rc<RefCell<Box<dyn FnMut(&dyn DomEvent)>>>;

#[derive(Default)]
pub struct FakeEvent {
    prevented: Cell<bool>,
}

impl DomEvent for FakeEvent {
    fn prevent_default(&self) {
        self.prevented.set(true);
    }
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, String, Handler)>,
}

impl Listeners {
    fn add(&mut self, event: &str, handler: Box<dyn FnMut(&dyn DomEvent)>) -> u64 {
        self.next_id += 1;
        self.entries
            .push((self.next_id, event.to_string(), Rc::new(RefCell::new(handler))));
        self.next_id
    }

    fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry, _, _)| *entry != id);
    }

    fn matching(&self, event: &str) -> Vec<Handler> {
        self.entries
            .iter()
            .filter(|(_, name, _)| name == event)
            .map(|(_, _, handler)| handler.clone())
            .collect()
    }
}

fn dispatch(handlers: Vec<Handler>) -> bool {
    let event = FakeEvent::default();
    for handler in handlers {
        (handler.borrow_mut())(&event);
    }
    event.prevented.get()
}

#[derive(Default)]
struct ElementState {
    tag: String,
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    styles: HashMap<String, String>,
    text: String,
    inner_html: String,
    disabled: bool,
    attached: bool,
    scroll_count: usize,
    remove_count: usize,
    listeners: Listeners,
}

#[derive(Clone)]
pub struct FakeElement {
    state: Rc<RefCell<ElementState>>,
}

impl FakeElement {
    /// An element already on the page.
    pub fn new(tag: &str) -> Self {
        let el = Self::detached(tag);
        el.state.borrow_mut().attached = true;
        el
    }

    pub fn detached(tag: &str) -> Self {
        Self {
            state: Rc::new(RefCell::new(ElementState {
                tag: tag.to_string(),
                ..Default::default()
            })),
        }
    }

    pub fn with_class(self, class: &str) -> Self {
        self.state.borrow_mut().classes.push(class.to_string());
        self
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.state
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_id(self, id: &str) -> Self {
        self.with_attr("id", id)
    }

    pub fn with_style(self, property: &str, value: &str) -> Self {
        self.state
            .borrow_mut()
            .styles
            .insert(property.to_string(), value.to_string());
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.state.borrow_mut().text = text.to_string();
        self
    }

    pub fn handle(&self) -> ElementRef {
        Rc::new(self.clone())
    }

    pub fn tag(&self) -> String {
        self.state.borrow().tag.clone()
    }

    pub fn id(&self) -> Option<String> {
        self.state.borrow().attributes.get("id").cloned()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.state.borrow().classes.iter().any(|c| c == class)
    }

    pub fn class_name(&self) -> String {
        self.state.borrow().classes.join(" ")
    }

    pub fn style_value(&self, property: &str) -> String {
        self.state
            .borrow()
            .styles
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    pub fn text_value(&self) -> String {
        self.state.borrow().text.clone()
    }

    pub fn inner_html(&self) -> String {
        self.state.borrow().inner_html.clone()
    }

    pub fn is_disabled(&self) -> bool {
        self.state.borrow().disabled
    }

    pub fn attached(&self) -> bool {
        self.state.borrow().attached
    }

    pub fn scroll_count(&self) -> usize {
        self.state.borrow().scroll_count
    }

    pub fn remove_count(&self) -> usize {
        self.state.borrow().remove_count
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.entries.len()
    }

    /// Fires a click; returns whether a listener prevented the default.
    pub fn click(&self) -> bool {
        let handlers = self.state.borrow().listeners.matching("click");
        dispatch(handlers)
    }

    fn mark_attached(&self) {
        self.state.borrow_mut().attached = true;
    }
}

fn strip_tags(html: &str) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

impl Element for FakeElement {
    fn has_class(&self, class: &str) -> bool {
        FakeElement::has_class(self, class)
    }

    fn class_tokens(&self) -> Vec<String> {
        self.state.borrow().classes.clone()
    }

    fn set_class(&self, class: &str, on: bool) {
        let mut state = self.state.borrow_mut();
        let present = state.classes.iter().any(|c| c == class);
        if on && !present {
            state.classes.push(class.to_string());
        } else if !on {
            state.classes.retain(|c| c != class);
        }
    }

    fn set_class_name(&self, name: &str) {
        self.state.borrow_mut().classes = name.split_whitespace().map(str::to_string).collect();
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.state.borrow().attributes.get(name).cloned()
    }

    fn style(&self, property: &str) -> String {
        self.style_value(property)
    }

    fn set_style(&self, property: &str, value: &str) {
        self.state
            .borrow_mut()
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn text(&self) -> String {
        self.text_value()
    }

    fn set_text(&self, text: &str) {
        let mut state = self.state.borrow_mut();
        state.text = text.to_string();
        state.inner_html = text.to_string();
    }

    fn set_inner_html(&self, html: &str) {
        let mut state = self.state.borrow_mut();
        state.text = strip_tags(html);
        state.inner_html = html.to_string();
    }

    fn set_disabled(&self, disabled: bool) {
        self.state.borrow_mut().disabled = disabled;
    }

    fn scroll_into_view(&self) {
        self.state.borrow_mut().scroll_count += 1;
    }

    fn is_attached(&self) -> bool {
        self.attached()
    }

    fn remove(&self) {
        let mut state = self.state.borrow_mut();
        if state.attached {
            state.attached = false;
            state.remove_count += 1;
        }
    }

    fn on(&self, event: &str, handler: Box<dyn FnMut(&dyn DomEvent)>) -> Subscription {
        let id = self.state.borrow_mut().listeners.add(event, handler);
        let weak: Weak<RefCell<ElementState>> = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().listeners.remove(id);
            }
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
struct DocumentState {
    by_id: HashMap<String, FakeElement>,
    body: Vec<FakeElement>,
}

#[derive(Clone, Default)]
pub struct FakeDocument {
    state: Rc<RefCell<DocumentState>>,
}

impl FakeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, element: &FakeElement) {
        if let Some(id) = element.id() {
            self.state.borrow_mut().by_id.insert(id, element.clone());
        }
    }

    /// Everything ever appended to the body, removed or not.
    pub fn body(&self) -> Vec<FakeElement> {
        self.state.borrow().body.clone()
    }
}

impl Document for FakeDocument {
    fn element_by_id(&self, id: &str) -> Option<ElementRef> {
        self.state.borrow().by_id.get(id).map(FakeElement::handle)
    }

    fn create_element(&self, tag: &str) -> Option<ElementRef> {
        Some(FakeElement::detached(tag).handle())
    }

    fn append_to_body(&self, element: &dyn Element) {
        if let Some(fake) = element.as_any().downcast_ref::<FakeElement>() {
            fake.mark_attached();
            self.state.borrow_mut().body.push(fake.clone());
        }
    }
}

type ScrollHandler = Rc<RefCell<Box<dyn FnMut()>>>;

struct ViewportState {
    scroll_y: f64,
    inner_width: f64,
    pathname: String,
    touch_start: bool,
    max_touch_points: i32,
    next_id: u64,
    scroll_handlers: Vec<(u64, ScrollHandler)>,
}

#[derive(Clone)]
pub struct FakeViewport {
    state: Rc<RefCell<ViewportState>>,
}

impl FakeViewport {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ViewportState {
                scroll_y: 0.0,
                inner_width: 1280.0,
                pathname: "/".into(),
                touch_start: false,
                max_touch_points: 0,
                next_id: 0,
                scroll_handlers: Vec::new(),
            })),
        }
    }

    pub fn set_inner_width(&self, width: f64) {
        self.state.borrow_mut().inner_width = width;
    }

    pub fn set_pathname(&self, path: &str) {
        self.state.borrow_mut().pathname = path.to_string();
    }

    pub fn set_touch(&self, touch_start: bool, max_touch_points: i32) {
        let mut state = self.state.borrow_mut();
        state.touch_start = touch_start;
        state.max_touch_points = max_touch_points;
    }

    /// Moves the page and fires every scroll listener.
    pub fn scroll_to(&self, y: f64) {
        let handlers: Vec<ScrollHandler> = {
            let mut state = self.state.borrow_mut();
            state.scroll_y = y;
            state.scroll_handlers.iter().map(|(_, h)| h.clone()).collect()
        };
        for handler in handlers {
            (handler.borrow_mut())();
        }
    }

    pub fn scroll_listener_count(&self) -> usize {
        self.state.borrow().scroll_handlers.len()
    }
}

impl Viewport for FakeViewport {
    fn scroll_y(&self) -> f64 {
        self.state.borrow().scroll_y
    }

    fn inner_width(&self) -> f64 {
        self.state.borrow().inner_width
    }

    fn pathname(&self) -> String {
        self.state.borrow().pathname.clone()
    }

    fn has_touch_start(&self) -> bool {
        self.state.borrow().touch_start
    }

    fn max_touch_points(&self) -> i32 {
        self.state.borrow().max_touch_points
    }

    fn on_scroll(&self, handler: Box<dyn FnMut()>) -> Subscription {
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = state.next_id;
            state.scroll_handlers.push((id, Rc::new(RefCell::new(handler))));
            id
        };
        let weak = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().scroll_handlers.retain(|(h, _)| *h != id);
            }
        })
    }
}

type EnterHandler = Rc<RefCell<Box<dyn FnMut(usize)>>>;

#[derive(Default)]
struct WatchState {
    options: Option<RevealOptions>,
    targets: usize,
    handler: Option<EnterHandler>,
}

#[derive(Clone, Default)]
pub struct FakeWatcher {
    state: Rc<RefCell<WatchState>>,
}

impl FakeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports target `index` as intersecting.
    pub fn enter(&self, index: usize) {
        let handler = self.state.borrow().handler.clone();
        if let Some(handler) = handler {
            (handler.borrow_mut())(index);
        }
    }

    pub fn is_watching(&self) -> bool {
        self.state.borrow().handler.is_some()
    }

    pub fn options(&self) -> Option<RevealOptions> {
        self.state.borrow().options.clone()
    }

    pub fn target_count(&self) -> usize {
        self.state.borrow().targets
    }
}

impl IntersectionWatcher for FakeWatcher {
    fn watch(
        &self,
        targets: &[ElementRef],
        options: &RevealOptions,
        on_enter: Box<dyn FnMut(usize)>,
    ) -> Subscription {
        {
            let mut state = self.state.borrow_mut();
            state.options = Some(options.clone());
            state.targets = targets.len();
            state.handler = Some(Rc::new(RefCell::new(on_enter)));
        }
        let weak = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().handler = None;
            }
        })
    }
}

struct FormFields {
    fields: Vec<(String, String)>,
    reset_count: usize,
    listeners: Listeners,
}

#[derive(Clone)]
pub struct FakeForm {
    state: Rc<RefCell<FormFields>>,
}

impl FakeForm {
    pub fn new(fields: &[(&str, &str)]) -> Self {
        Self {
            state: Rc::new(RefCell::new(FormFields {
                fields: fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                reset_count: 0,
                listeners: Listeners::default(),
            })),
        }
    }

    pub fn reset_count(&self) -> usize {
        self.state.borrow().reset_count
    }

    /// Fires a submit; returns whether a listener prevented the default.
    pub fn submit(&self) -> bool {
        let handlers = self.state.borrow().listeners.matching("submit");
        dispatch(handlers)
    }
}

impl FormElement for FakeForm {
    fn fields(&self) -> Vec<(String, String)> {
        self.state.borrow().fields.clone()
    }

    fn reset(&self) {
        let mut state = self.state.borrow_mut();
        state.reset_count += 1;
        for (_, value) in state.fields.iter_mut() {
            value.clear();
        }
    }

    fn on_submit(&self, handler: Box<dyn FnMut(&dyn DomEvent)>) -> Subscription {
        let id = self.state.borrow_mut().listeners.add("submit", handler);
        let weak = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().listeners.remove(id);
            }
        })
    }
}

struct Timer {
    due: u64,
    id: TimerId,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct LoopState {
    now: u64,
    next_id: TimerId,
    timers: Vec<Timer>,
    frames: Vec<Box<dyn FnOnce()>>,
}

/// Virtual clock: nothing runs until the test advances time, flushes
/// frames, or drives the futures pool.
#[derive(Clone)]
pub struct ManualLoop {
    state: Rc<RefCell<LoopState>>,
    pool: Rc<RefCell<LocalPool>>,
    spawner: LocalSpawner,
}

impl ManualLoop {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            state: Rc::new(RefCell::new(LoopState::default())),
            pool: Rc::new(RefCell::new(pool)),
            spawner,
        }
    }

    pub fn handle(&self) -> Rc<dyn EventLoop> {
        Rc::new(self.clone())
    }

    pub fn now(&self) -> u64 {
        self.state.borrow().now
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Fires due timers in order, then parks the clock at `now + millis`.
    pub fn advance(&self, millis: u64) {
        let target = self.now() + millis;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let index = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.id))
                    .map(|(i, _)| i);
                index.map(|i| {
                    let timer = state.timers.remove(i);
                    state.now = timer.due;
                    timer
                })
            };
            match next {
                Some(timer) => {
                    (timer.task)();
                    self.run_until_stalled();
                }
                None => break,
            }
        }
        self.state.borrow_mut().now = target;
    }

    pub fn run_frames(&self) {
        let frames = std::mem::take(&mut self.state.borrow_mut().frames);
        for frame in frames {
            frame();
        }
    }

    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }
}

impl EventLoop for ManualLoop {
    fn set_timeout(&self, millis: u32, task: Box<dyn FnOnce()>) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        let due = state.now + u64::from(millis);
        state.timers.push(Timer { due, id, task });
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.state.borrow_mut().timers.retain(|t| t.id != id);
    }

    fn request_frame(&self, task: Box<dyn FnOnce()>) {
        self.state.borrow_mut().frames.push(task);
    }

    fn spawn(&self, task: LocalTask) {
        self.spawner
            .spawn_local(task)
            .expect("local pool accepts tasks");
    }
}

enum Reply {
    Status(u16, String),
    Fail(String),
}

struct TransportState {
    reply: Reply,
    gated: bool,
    gates: Vec<oneshot::Sender<()>>,
    requests: Vec<(String, Vec<(String, String)>)>,
}

#[derive(Clone)]
pub struct FakeTransport {
    state: Rc<RefCell<TransportState>>,
}

impl FakeTransport {
    fn with(reply: Reply, gated: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(TransportState {
                reply,
                gated,
                gates: Vec::new(),
                requests: Vec::new(),
            })),
        }
    }

    pub fn replying(status: u16, body: &str) -> Self {
        Self::with(Reply::Status(status, body.to_string()), false)
    }

    pub fn failing(message: &str) -> Self {
        Self::with(Reply::Fail(message.to_string()), false)
    }

    /// Replies only after [`FakeTransport::release`].
    pub fn gated(status: u16, body: &str) -> Self {
        Self::with(Reply::Status(status, body.to_string()), true)
    }

    pub fn release(&self) {
        let gates = std::mem::take(&mut self.state.borrow_mut().gates);
        for gate in gates {
            let _ = gate.send(());
        }
    }

    pub fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.state.borrow().requests.clone()
    }
}

#[async_trait(?Send)]
impl ContactTransport for FakeTransport {
    async fn submit(&self, endpoint: &str, fields: Vec<(String, String)>) -> SiteResult<ContactResponse> {
        let gate = {
            let mut state = self.state.borrow_mut();
            state.requests.push((endpoint.to_string(), fields));
            if state.gated {
                let (tx, rx) = oneshot::channel();
                state.gates.push(tx);
                Some(rx)
            } else {
                None
            }
        };
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        let reply = match &self.state.borrow().reply {
            Reply::Status(status, body) => Ok(ContactResponse {
                status: *status,
                body: body.clone(),
            }),
            Reply::Fail(message) => Err(SiteError::Network(message.clone())),
        };
        reply
    }
}
