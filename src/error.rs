//! Error taxonomy for the screenshot-to-HTML chain.
//!
//! Every failure is typed here and propagated with `?`. The front end
//! collapses all of them into a single "An error occurred" message, so
//! variants exist for logging and tests, not for recovery.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("No API key found. Set API_KEY or GEMINI_API_KEY, or run with --save-key")]
    MissingApiKey,

    #[error("Unsupported image type '{0}' (expected jpg, jpeg or png)")]
    UnsupportedImage(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Screen capture failed: {0}")]
    Capture(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model returned no text{}", .0.as_deref().map(|r| format!(" (blocked: {})", r)).unwrap_or_default())]
    EmptyReply(Option<String>),

    #[error("Malformed model response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Could not open preview: {0}")]
    Preview(String),

    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Unsafe output path: {0}")]
    UnsafePath(String),
}

pub type Result<T> = std::result::Result<T, ChainError>;
