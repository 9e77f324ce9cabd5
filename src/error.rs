use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid channel: {0} (expected 0-3)")]
    InvalidChannel(usize),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
