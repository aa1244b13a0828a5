use std::cell::Cell;
use std::rc::Rc;

use log::debug;

use crate::config::NavigationConfig;
use crate::dom::{Bindings, DomEvent, ElementRef, Viewport};

const ACTIVE: &str = "active";

/// Everything the navigation bar is made of. Missing parts switch their
/// feature off.
#[derive(Default)]
pub struct NavElements {
    pub toggle: Option<ElementRef>,
    pub menu: Option<ElementRef>,
    pub navbar: Option<ElementRef>,
    /// Links inside the menu panel; clicking one closes the menu.
    pub menu_links: Vec<ElementRef>,
    /// Every nav link on the page, checked against the current path.
    pub links: Vec<ElementRef>,
}

pub struct Navigation {
    elements: NavElements,
    viewport: Rc<dyn Viewport>,
    config: NavigationConfig,
    menu_open: Rc<Cell<bool>>,
}

impl Navigation {
    pub fn new(elements: NavElements, viewport: Rc<dyn Viewport>, config: NavigationConfig) -> Self {
        Self {
            elements,
            viewport,
            config,
            menu_open: Rc::new(Cell::new(false)),
        }
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open.get()
    }

    pub fn bind(&self) -> Bindings {
        let mut bindings = Bindings::default();

        match (&self.elements.toggle, &self.elements.menu) {
            (Some(toggle), Some(menu)) => {
                let open = self.menu_open.clone();
                let (t, m) = (toggle.clone(), menu.clone());
                bindings.push(toggle.on(
                    "click",
                    Box::new(move |_: &dyn DomEvent| {
                        open.set(!open.get());
                        m.set_class(ACTIVE, open.get());
                        t.set_class(ACTIVE, open.get());
                    }),
                ));

                for link in &self.elements.menu_links {
                    let open = self.menu_open.clone();
                    let (t, m) = (toggle.clone(), menu.clone());
                    bindings.push(link.on(
                        "click",
                        Box::new(move |_: &dyn DomEvent| {
                            open.set(false);
                            m.set_class(ACTIVE, false);
                            t.set_class(ACTIVE, false);
                        }),
                    ));
                }
            }
            _ => debug!("nav toggle or menu missing, mobile menu disabled"),
        }

        if let Some(navbar) = &self.elements.navbar {
            let navbar = navbar.clone();
            let viewport = self.viewport.clone();
            let config = self.config.clone();
            bindings.push(self.viewport.on_scroll(Box::new(move || {
                navbar.set_style("background", navbar_background(&config, viewport.scroll_y()));
            })));
        }

        self.highlight_active_link();
        bindings
    }

    fn highlight_active_link(&self) {
        let path = self.viewport.pathname();
        for link in &self.elements.links {
            if link.attribute("href").as_deref() == Some(path.as_str()) {
                link.set_style("color", &self.config.active_link_color);
            }
        }
    }
}

pub fn navbar_background(config: &NavigationConfig, scroll_y: f64) -> &str {
    if scroll_y > config.scroll_threshold {
        &config.solid_background
    } else {
        &config.translucent_background
    }
}
