use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use log::debug;

use crate::config::RevealOptions;
use crate::dom::{Bindings, Element, ElementRef, IntersectionWatcher};
use crate::runtime::EventLoop;

const CANDIDATE_PREFIX: &str = "animate-";
const ARMED_CLASS: &str = "animate";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealVariant {
    FadeInUp,
    FadeInLeft,
    FadeInRight,
    Plain,
}

impl RevealVariant {
    pub fn of(element: &dyn Element) -> Self {
        if element.has_class("animate-fadeInUp") {
            RevealVariant::FadeInUp
        } else if element.has_class("animate-fadeInLeft") {
            RevealVariant::FadeInLeft
        } else if element.has_class("animate-fadeInRight") {
            RevealVariant::FadeInRight
        } else {
            RevealVariant::Plain
        }
    }

    pub fn initial_transform(self) -> Option<&'static str> {
        match self {
            RevealVariant::FadeInUp => Some("translateY(30px)"),
            RevealVariant::FadeInLeft => Some("translateX(-30px)"),
            RevealVariant::FadeInRight => Some("translateX(30px)"),
            RevealVariant::Plain => None,
        }
    }
}

pub fn is_reveal_candidate(element: &dyn Element) -> bool {
    element
        .class_tokens()
        .iter()
        .any(|token| token.starts_with(CANDIDATE_PREFIX))
}

/// CSS time value to milliseconds; anything unparsable is no delay.
pub fn parse_delay_ms(value: &str) -> u32 {
    let value = value.trim();
    let millis = if let Some(ms) = value.strip_suffix("ms") {
        ms.trim().parse::<f64>().ok()
    } else {
        value
            .strip_suffix('s')
            .unwrap_or(value)
            .trim()
            .parse::<f64>()
            .ok()
            .map(|secs| secs * 1000.0)
    };
    match millis {
        Some(ms) if ms.is_finite() && ms > 0.0 => ms.round() as u32,
        _ => 0,
    }
}

/// One-shot reveal of elements as they scroll into view.
pub struct Animations {
    elements: Rc<Vec<ElementRef>>,
    watcher: Rc<dyn IntersectionWatcher>,
    event_loop: Rc<dyn EventLoop>,
    options: RevealOptions,
    armed: Rc<RefCell<HashSet<usize>>>,
}

impl Animations {
    pub fn new(
        candidates: Vec<ElementRef>,
        watcher: Rc<dyn IntersectionWatcher>,
        event_loop: Rc<dyn EventLoop>,
        options: RevealOptions,
    ) -> Self {
        let elements = candidates
            .into_iter()
            .filter(|el| is_reveal_candidate(&**el))
            .collect();
        Self {
            elements: Rc::new(elements),
            watcher,
            event_loop,
            options,
            armed: Rc::new(RefCell::new(HashSet::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn is_armed(&self, index: usize) -> bool {
        self.armed.borrow().contains(&index)
    }

    pub fn bind(&self) -> Bindings {
        let mut bindings = Bindings::default();
        if self.elements.is_empty() {
            debug!("no reveal candidates on this page");
            return bindings;
        }

        for el in self.elements.iter() {
            el.set_style("opacity", "0");
            el.set_style("transition", &self.options.transition);
            if let Some(transform) = RevealVariant::of(&**el).initial_transform() {
                el.set_style("transform", transform);
            }
        }

        let elements = self.elements.clone();
        let armed = self.armed.clone();
        let event_loop = self.event_loop.clone();
        bindings.push(self.watcher.watch(
            &self.elements,
            &self.options,
            Box::new(move |index: usize| {
                let Some(el) = elements.get(index) else {
                    return;
                };
                if !armed.borrow_mut().insert(index) {
                    return;
                }
                el.set_class(ARMED_CLASS, true);

                let delay = parse_delay_ms(&el.style("animation-delay"));
                let el = el.clone();
                event_loop.set_timeout(
                    delay,
                    Box::new(move || {
                        el.set_style("opacity", "1");
                        el.set_style("transform", "translateY(0) translateX(0)");
                    }),
                );
            }),
        ));
        bindings
    }
}
