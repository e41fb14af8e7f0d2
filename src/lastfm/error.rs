use thiserror::Error;

/// Last.fm's code for "Invalid parameters", which includes "Track not found".
const INVALID_PARAMETERS: i64 = 6;

#[derive(Debug, Error)]
pub enum LastFmError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("last.fm error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LastFmError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LastFmError::Api { code, .. } if *code == INVALID_PARAMETERS)
    }
}
