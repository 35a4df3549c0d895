// src/error.rs
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("unexpectedly empty result page at offset {offset}")]
    EmptyPage { offset: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}
