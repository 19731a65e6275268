//! Gemini multi-turn session over the Google AI REST API.
//!
//! Mirrors a client-side chat session: the full history is resent with every
//! turn, and both the user turn and the model reply are appended only after
//! a successful response.
//!
//! - API key in URL query param, not header
//! - Non-streaming: `:generateContent`, one JSON body
//! - Streaming: `:streamGenerateContent?alt=sse`, `data: {...}` lines
//! - Token usage in `usageMetadata` (final chunk when streaming)

use super::streaming;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, Part, UsageMetadata,
};
use super::ChatModel;
use crate::capture::ImageRef;
use crate::error::{ChainError, Result};
use crate::settings::ModelSettings;
use async_trait::async_trait;
use base64::Engine as _;

/// Flash pricing per 1M tokens (prompts under 128k).
const INPUT_COST_PER_MILLION: f64 = 0.075;
const OUTPUT_COST_PER_MILLION: f64 = 0.30;

/// Receives text deltas while a streamed reply arrives.
pub type DeltaSink = Box<dyn FnMut(&str) + Send + Sync>;

pub struct GeminiSession {
    client: reqwest::Client,
    api_key: String,
    settings: ModelSettings,
    history: Vec<Content>,
    delta_sink: Option<DeltaSink>,
}

impl GeminiSession {
    pub fn new(settings: ModelSettings, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            settings,
            history: Vec::new(),
            delta_sink: None,
        }
    }

    /// Forward streamed text to `sink` as it arrives. Only used when
    /// `settings.stream` is set.
    pub fn with_delta_sink(mut self, sink: DeltaSink) -> Self {
        self.delta_sink = Some(sink);
        self
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    fn endpoint(&self, key: &str) -> String {
        let base = self.settings.base_url.trim_end_matches('/');
        if self.settings.stream {
            format!(
                "{}/v1beta/models/{}:streamGenerateContent?alt=sse&key={}",
                base, self.settings.model, key
            )
        } else {
            format!(
                "{}/v1beta/models/{}:generateContent?key={}",
                base, self.settings.model, key
            )
        }
    }

    /// Request body for `user_turn` on top of the current history.
    pub fn build_request(&self, user_turn: &Content) -> GenerateContentRequest {
        let mut contents = self.history.clone();
        contents.push(user_turn.clone());
        GenerateContentRequest {
            contents,
            generation_config: self.settings.generation.clone(),
            safety_settings: self.settings.safety.clone(),
        }
    }

    async fn post(&self, body: &GenerateContentRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.endpoint(&self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("[LLM] Gemini API returned {}: {}", status, body);
            return Err(ChainError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn generate(&self, body: &GenerateContentRequest) -> Result<(String, UsageMetadata)> {
        let response = self.post(body).await?;
        let raw = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&raw)?;
        let usage = parsed.usage_metadata.unwrap_or_default();
        match parsed.text() {
            Some(text) => Ok((text, usage)),
            None => Err(ChainError::EmptyReply(parsed.block_reason())),
        }
    }

    async fn generate_streaming(
        &mut self,
        body: &GenerateContentRequest,
        start: std::time::Instant,
    ) -> Result<(String, UsageMetadata)> {
        let mut response = self.post(body).await?;
        log::info!("[LLM] TTFB: {}ms", start.elapsed().as_millis());

        let mut accumulated_text = String::new();
        let mut sse_buffer = String::new();
        let mut utf8_tail = Vec::new();
        let mut usage = UsageMetadata::default();
        let mut block_reason = None;
        let mut ttft_logged = false;

        while let Some(chunk) = response.chunk().await? {
            streaming::push_utf8_chunk(&mut utf8_tail, &mut sse_buffer, &chunk);
            for data in streaming::parse_data_only_sse_events(&mut sse_buffer) {
                let event: GenerateContentResponse = match serde_json::from_str(&data) {
                    Ok(event) => event,
                    Err(e) => {
                        log::warn!("[LLM] Skipping unparseable SSE event: {}", e);
                        continue;
                    }
                };
                if let Some(delta) = event.text() {
                    if !ttft_logged {
                        log::info!("[LLM] TTFT: {}ms", start.elapsed().as_millis());
                        ttft_logged = true;
                    }
                    if let Some(sink) = self.delta_sink.as_mut() {
                        sink(&delta);
                    }
                    accumulated_text.push_str(&delta);
                }
                if let Some(meta) = event.usage_metadata {
                    usage = meta;
                }
                if let Some(reason) = event.block_reason() {
                    block_reason = Some(reason);
                }
            }
        }

        if accumulated_text.is_empty() {
            return Err(ChainError::EmptyReply(block_reason));
        }
        Ok((accumulated_text, usage))
    }
}

#[async_trait]
impl ChatModel for GeminiSession {
    async fn send_turn(&mut self, prompt: &str, image: &ImageRef) -> Result<String> {
        let image_b64 =
            base64::engine::general_purpose::STANDARD.encode(image.read_bytes()?);
        let user_turn = Content::user(vec![
            Part::text(prompt),
            Part::inline(image.mime_type(), image_b64),
        ]);
        let body = self.build_request(&user_turn);

        log::info!(
            "[LLM] Model: {} (turn {}, {} prompt chars{})",
            self.settings.model,
            self.history.len() / 2 + 1,
            prompt.len(),
            if self.settings.stream { ", streaming" } else { "" }
        );
        log::debug!("[LLM] POST {}", self.endpoint("***"));

        let start = std::time::Instant::now();
        let (text, usage) = if self.settings.stream {
            self.generate_streaming(&body, start).await?
        } else {
            self.generate(&body).await?
        };
        log::info!(
            "[LLM] Reply: {} chars in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );

        if usage.prompt_token_count > 0 || usage.candidates_token_count > 0 {
            log::info!("[LLM] Input tokens: {}", usage.prompt_token_count);
            log::info!("[LLM] Output tokens: {}", usage.candidates_token_count);
            log::info!("[LLM] Estimated cost: ${:.6}", estimated_cost(&usage));
        }

        self.history.push(user_turn);
        self.history.push(Content::model(&text));
        Ok(text)
    }
}

fn estimated_cost(usage: &UsageMetadata) -> f64 {
    (usage.prompt_token_count as f64 * INPUT_COST_PER_MILLION
        + usage.candidates_token_count as f64 * OUTPUT_COST_PER_MILLION)
        / 1_000_000.0
}
