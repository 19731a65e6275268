//! Configuration resolution and API key storage.
//!
//! Handles:
//! - Model settings (name, endpoint, pass-through generation/safety config)
//! - Run settings derived from the command line
//! - API key lookup (env var, then OS keychain via keyring crate)

use crate::cli::Cli;
use crate::error::{ChainError, Result};
use crate::llm::types::{block_none_safety_settings, GenerationConfig, SafetySetting};
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Env vars checked for the key, in order.
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

const KEYRING_SERVICE: &str = "ui-coder";
const KEYRING_USER: &str = "gemini";

/// Everything the Gemini session needs apart from the key.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub base_url: String,
    pub generation: GenerationConfig,
    pub safety: Vec<SafetySetting>,
    pub stream: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            generation: GenerationConfig::default(),
            safety: block_none_safety_settings(),
            stream: false,
        }
    }
}

/// Where the image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    PrimaryMonitor,
}

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub model: ModelSettings,
    pub source: ImageSource,
    pub framework: String,
    pub output_path: PathBuf,
    pub temp_image_path: PathBuf,
}

impl Settings {
    /// Merge CLI arguments with `GEMINI_MODEL` / `GEMINI_BASE_URL`.
    pub fn from_cli(cli: &Cli) -> Self {
        Self::resolve(cli, |name| std::env::var(name).ok())
    }

    fn resolve(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let model = cli
            .model
            .clone()
            .or_else(|| non_empty("GEMINI_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = non_empty("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let source = match &cli.image {
            Some(path) if !cli.capture => ImageSource::File(path.clone()),
            _ => ImageSource::PrimaryMonitor,
        };

        Self {
            model: ModelSettings {
                model,
                base_url,
                stream: cli.stream,
                ..ModelSettings::default()
            },
            source,
            framework: cli.framework.clone(),
            output_path: cli.output.clone(),
            temp_image_path: cli.temp_image.clone(),
        }
    }
}

/// First non-empty key among `API_KEY_VARS`, as seen by `lookup`.
pub fn api_key_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
}

/// Find the Gemini API key: env vars first, then the OS keychain.
pub fn resolve_api_key() -> Result<String> {
    if let Some(key) = api_key_from_env(|name| std::env::var(name).ok()) {
        return Ok(key);
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
        if let Ok(key) = entry.get_password() {
            if !key.trim().is_empty() {
                log::info!("[SETTINGS] Loaded Gemini key from OS keychain");
                return Ok(key.trim().to_string());
            }
        }
    }

    Err(ChainError::MissingApiKey)
}

/// Save an API key to the OS keychain.
pub fn save_api_key(api_key: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    entry.set_password(api_key.trim())?;
    log::info!("[SETTINGS] API key saved to OS keychain");
    Ok(())
}
