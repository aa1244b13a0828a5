use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("dom error: {0}")]
    Dom(String),
}

impl SiteError {
    pub fn dom(value: JsValue) -> Self {
        SiteError::Dom(
            value
                .as_string()
                .unwrap_or_else(|| format!("{:?}", value)),
        )
    }
}

impl From<gloo_net::Error> for SiteError {
    fn from(err: gloo_net::Error) -> Self {
        SiteError::Network(err.to_string())
    }
}

pub type SiteResult<T> = Result<T, SiteError>;
