pub mod browser;
pub mod config;
pub mod dom;
pub mod error;
pub mod exports;
pub mod page;
pub mod runtime;
pub mod utils;

pub mod components {
    pub mod animation;
    pub mod contact_form;
    pub mod navigation;
    pub mod notification;
    pub mod scroll_effects;
}

#[cfg(test)]
mod testing;
