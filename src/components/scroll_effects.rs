use std::rc::Rc;

use log::debug;

use crate::dom::{Bindings, Document, DomEvent, ElementRef, Viewport};

pub struct ScrollEffects {
    anchors: Vec<ElementRef>,
    hero: Option<ElementRef>,
    document: Rc<dyn Document>,
    viewport: Rc<dyn Viewport>,
    parallax_factor: f64,
}

impl ScrollEffects {
    pub fn new(
        anchors: Vec<ElementRef>,
        hero: Option<ElementRef>,
        document: Rc<dyn Document>,
        viewport: Rc<dyn Viewport>,
        parallax_factor: f64,
    ) -> Self {
        Self {
            anchors,
            hero,
            document,
            viewport,
            parallax_factor,
        }
    }

    pub fn bind(&self) -> Bindings {
        let mut bindings = Bindings::default();

        for anchor in &self.anchors {
            let Some(href) = anchor.attribute("href").filter(|h| h.starts_with('#')) else {
                continue;
            };
            let document = self.document.clone();
            bindings.push(anchor.on(
                "click",
                Box::new(move |event: &dyn DomEvent| {
                    event.prevent_default();
                    match fragment_target(&href).and_then(|id| document.element_by_id(id)) {
                        Some(target) => target.scroll_into_view(),
                        None => debug!("no element for anchor {}", href),
                    }
                }),
            ));
        }

        if let Some(hero) = &self.hero {
            let hero = hero.clone();
            let viewport = self.viewport.clone();
            let factor = self.parallax_factor;
            bindings.push(self.viewport.on_scroll(Box::new(move || {
                let offset = parallax_offset(viewport.scroll_y(), factor);
                hero.set_style("transform", &format!("translate3d(0, {}px, 0)", offset));
            })));
        }

        bindings
    }
}

/// The id an in-page `href` points at, if any.
pub fn fragment_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

pub fn parallax_offset(scroll_y: f64, factor: f64) -> f64 {
    let offset = scroll_y * factor;
    // -0 would render as "-0px"
    if offset == 0.0 {
        0.0
    } else {
        offset
    }
}
