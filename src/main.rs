use lending_frontend::config::{self, SiteConfig};
use lending_frontend::page;
use log::info;

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting site scripts");
    page::start(SiteConfig::default());
}
