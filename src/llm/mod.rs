//! LLM domain: the model seam and its Gemini implementation.
//!
//! The chain only talks to `ChatModel`. Everything Gemini-specific stays
//! behind it so tests can swap in a scripted model.
//!
//!   - gemini.rs   : multi-turn session over the REST API
//!   - prompts.rs  : prompt templates (pure functions)
//!   - streaming.rs: SSE parsing + code fence cleanup
//!   - types.rs    : wire types

mod gemini;
pub mod prompts;
pub mod streaming;
pub mod types;

pub use gemini::{DeltaSink, GeminiSession};

use crate::capture::ImageRef;
use crate::error::Result;
use async_trait::async_trait;

/// One conversational session with a multimodal model.
///
/// Each call is a turn: the prompt plus the image, answered with text.
/// Implementations keep their own history; a failed turn must not be
/// recorded in it.
#[async_trait]
pub trait ChatModel: Send {
    async fn send_turn(&mut self, prompt: &str, image: &ImageRef) -> Result<String>;
}

