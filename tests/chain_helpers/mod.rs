//! Shared fixtures for the chain and Gemini session tests.
//!
//! - `ScriptedModel`: a `ChatModel` that replays canned replies and records
//!   every prompt it was sent
//! - `spawn_gemini_stub`: a one-request-per-connection HTTP server standing
//!   in for the Gemini endpoint

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use ui_coder_lib::capture::{self, ImageRef};
use ui_coder_lib::error::{ChainError, Result};
use ui_coder_lib::llm::ChatModel;

/// One reply for `ScriptedModel`: text, or a failure.
pub enum Reply {
    Text(&'static str),
    Fail,
}

pub struct ScriptedModel {
    replies: VecDeque<Reply>,
    pub prompts: Vec<String>,
    pub image_paths: Vec<PathBuf>,
    pub image_sizes: Vec<usize>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: replies.into(),
            prompts: Vec::new(),
            image_paths: Vec::new(),
            image_sizes: Vec::new(),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn send_turn(&mut self, prompt: &str, image: &ImageRef) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.image_paths.push(image.path().to_path_buf());
        self.image_sizes.push(image.read_bytes()?.len());
        match self.replies.pop_front() {
            Some(Reply::Text(t)) => Ok(t.to_string()),
            Some(Reply::Fail) => Err(ChainError::Api {
                status: 503,
                body: "UNAVAILABLE".to_string(),
            }),
            None => panic!("ScriptedModel ran out of replies"),
        }
    }
}

/// Prepare a small RGBA screenshot at `dir/temp_image.jpg`.
pub fn sample_image(dir: &Path) -> ImageRef {
    let rgba = image::RgbaImage::from_fn(16, 12, |x, y| {
        image::Rgba([(x * 16) as u8, (y * 20) as u8, 128, 200])
    });
    capture::prepare(
        &image::DynamicImage::ImageRgba8(rgba),
        &dir.join("temp_image.jpg"),
    )
    .expect("prepare sample image")
}

/// A canned HTTP response from the stub.
pub struct StubResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    /// Send the body in two writes, pausing after this many bytes.
    pub split_at: Option<usize>,
}

impl StubResponse {
    pub fn json(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.to_string(),
            split_at: None,
        }
    }

    pub fn sse(events: &[serde_json::Value]) -> Self {
        let body = events
            .iter()
            .map(|e| format!("data: {}\r\n\r\n", e))
            .collect::<String>();
        Self {
            status: 200,
            content_type: "text/event-stream",
            body,
            split_at: None,
        }
    }

    pub fn split_at(mut self, at: usize) -> Self {
        self.split_at = Some(at);
        self
    }

    pub fn error(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
            split_at: None,
        }
    }
}

/// What the stub received.
#[derive(Debug)]
pub struct StubRequest {
    pub path: String,
    pub body: serde_json::Value,
}

/// Gemini reply body carrying `text`.
pub fn gemini_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 1000, "candidatesTokenCount": 200}
    })
}

/// Serve `responses` in order, one connection each. Returns the base URL
/// and a handle resolving to the captured requests.
pub async fn spawn_gemini_stub(
    responses: Vec<StubResponse>,
) -> (String, tokio::task::JoinHandle<Vec<StubRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let base_url = format!("http://{}", listener.local_addr().expect("stub addr"));

    let handle = tokio::spawn(async move {
        let mut captured = Vec::new();
        for response in responses {
            let (mut socket, _) = listener.accept().await.expect("accept");
            captured.push(read_request(&mut socket).await);

            let reason = if response.status == 200 { "OK" } else { "Error" };
            let head = format!(
                "HTTP/1.1 {} {}\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                response.status,
                reason,
                response.content_type,
                response.body.len()
            );
            socket.write_all(head.as_bytes()).await.expect("write head");
            let body = response.body.as_bytes();
            match response.split_at {
                Some(at) => {
                    socket.write_all(&body[..at]).await.expect("write body head");
                    socket.flush().await.expect("flush");
                    tokio::time::sleep(std::time::Duration::from_millis(150)).await;
                    socket.write_all(&body[at..]).await.expect("write body tail");
                }
                None => socket.write_all(body).await.expect("write body"),
            }
            socket.shutdown().await.ok();
        }
        captured
    });

    (base_url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> StubRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.expect("read request");
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let path = head
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.expect("read body");
        assert!(n > 0, "client closed mid-body");
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = serde_json::from_slice(&buf[header_end..header_end + content_length])
        .unwrap_or(serde_json::Value::Null);
    StubRequest { path, body }
}
