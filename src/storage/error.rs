use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("no cached charts at {}, run `fetch` first", .0.display())]
    CacheMissing(PathBuf),

    #[error("malformed chart data: {0}")]
    Malformed(String),
}
