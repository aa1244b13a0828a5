use log::Level;

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose console while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub contact_endpoint: String,
    pub navigation: NavigationConfig,
    pub reveal: RevealOptions,
    pub parallax_factor: f64,
    pub notifications: NotificationConfig,
    pub messages: Messages,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            contact_endpoint: "/contact".into(),
            navigation: NavigationConfig::default(),
            reveal: RevealOptions::default(),
            parallax_factor: -0.5,
            notifications: NotificationConfig::default(),
            messages: Messages::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NavigationConfig {
    pub scroll_threshold: f64,
    pub solid_background: String,
    pub translucent_background: String,
    pub active_link_color: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            scroll_threshold: 100.0,
            solid_background: "rgba(15, 15, 35, 0.98)".into(),
            translucent_background: "rgba(15, 15, 35, 0.95)".into(),
            active_link_color: "var(--primary-color)".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RevealOptions {
    /// Visible fraction that counts as "in view".
    pub threshold: f64,
    pub root_margin: String,
    pub transition: String,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".into(),
            transition: "opacity 0.6s ease-out, transform 0.6s ease-out".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NotificationConfig {
    pub display_ms: u32,
    /// Matches the toast's CSS transition.
    pub fade_ms: u32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_ms: 5_000,
            fade_ms: 300,
        }
    }
}

/// User-facing copy.
#[derive(Clone, Debug, PartialEq)]
pub struct Messages {
    pub sending: String,
    pub sent: String,
    pub server_error_fallback: String,
    pub send_failed: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            sending: "Отправка...".into(),
            sent: "Сообщение успешно отправлено!".into(),
            server_error_fallback: "Произошла ошибка".into(),
            send_failed: "Произошла ошибка при отправке".into(),
        }
    }
}
