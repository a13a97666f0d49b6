use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("typing animation needs at least one phrase")]
    EmptyPhraseList,

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("missing element `{0}`")]
    MissingElement(&'static str),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for SiteError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| js_sys::JSON::stringify(&value).ok().and_then(|text| text.as_string()))
            .unwrap_or_else(|| "unknown JavaScript error".to_string());
        Self::Dom(message)
    }
}

pub type SiteResult<T> = Result<T, SiteError>;
