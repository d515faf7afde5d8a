use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Human-readable message the server attached to an error response.
    ///
    /// Looks for a JSON `message` then `error` key, and falls back to the raw body.
    pub fn server_message(&self) -> Option<String> {
        let ApiError::Status { body, status } = self else {
            return None;
        };
        let trimmed = body.trim();
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
            if let Some(msg) = json
                .get("message")
                .or_else(|| json.get("error"))
                .and_then(|v| v.as_str())
            {
                return Some(msg.to_string());
            }
        }
        if trimmed.is_empty() {
            Some(format!("HTTP {}", status))
        } else {
            Some(trimmed.to_string())
        }
    }
}
