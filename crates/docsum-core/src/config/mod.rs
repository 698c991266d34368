//! Configuration system for docsum.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{DocsumError, DocsumResult};

/// Default upload limit: 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Default number of characters of document text sent for analysis.
pub const DEFAULT_ANALYSIS_MAX_CHARS: usize = 4000;

const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
const DATABASE_FILE: &str = "docsum.db";

/// Settings for the analysis model.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// OpenRouter API key.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model identifier, e.g. `openai/gpt-4o-mini`.
    pub model: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Characters of document text included in the prompt.
    pub max_chars: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            max_chars: DEFAULT_ANALYSIS_MAX_CHARS,
        }
    }
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_chars", &self.max_chars)
            .finish()
    }
}

impl LlmSettings {
    /// The API key, or a configuration error naming the variable to set.
    pub fn require_api_key(&self) -> DocsumResult<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                DocsumError::Configuration(
                    "OpenRouter API key not found. Set OPENROUTER_API_KEY environment variable."
                        .to_string(),
                )
            })
    }
}

/// Main docsum configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsumConfig {
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: u64,
    /// Directory for stored documents and the default database.
    pub data_dir: PathBuf,
    /// SQLite database path. Defaults to `<data_dir>/docsum.db`.
    pub database_path: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Content-sniff BOM-less plain-text uploads before extraction.
    pub sniff_text: bool,
    /// Analysis model settings.
    pub llm: LlmSettings,
}

impl Default for DocsumConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            data_dir: default_data_dir(),
            database_path: None,
            log_level: "info".to_string(),
            sniff_text: false,
            llm: LlmSettings::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".docsum"))
        .unwrap_or_else(|| PathBuf::from(".docsum"))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl DocsumConfig {
    /// Set the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the upload size limit.
    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Enable content sniffing for plain-text uploads.
    pub fn with_text_sniffing(mut self) -> Self {
        self.sniff_text = true;
        self
    }

    /// Resolved SQLite database path.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DATABASE_FILE))
    }

    /// Directory holding stored document bytes.
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("objects")
    }

    /// Create config from environment variables.
    ///
    /// Loads a `.env` file first if one is present, then reads:
    /// - `DOCSUM_MAX_UPLOAD_BYTES` (default: 5242880)
    /// - `DOCSUM_DATA_DIR` (default: ~/.docsum)
    /// - `DOCSUM_DATABASE_PATH` (default: `<data_dir>/docsum.db`)
    /// - `DOCSUM_LOG_LEVEL` (default: info)
    /// - `DOCSUM_SNIFF_TEXT` (default: false)
    /// - `OPENROUTER_API_KEY`
    /// - `DOCSUM_MODEL` (default: openai/gpt-4o-mini)
    /// - `DOCSUM_LLM_BASE_URL` (default: https://openrouter.ai/api/v1)
    /// - `DOCSUM_LLM_TIMEOUT_SECS` (default: 60)
    /// - `DOCSUM_ANALYSIS_MAX_CHARS` (default: 4000)
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(bytes) = var("DOCSUM_MAX_UPLOAD_BYTES") {
            if let Ok(bytes) = bytes.trim().parse() {
                config.max_upload_bytes = bytes;
            }
        }

        if let Some(dir) = var("DOCSUM_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(path) = var("DOCSUM_DATABASE_PATH") {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(level) = var("DOCSUM_LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(sniff) = var("DOCSUM_SNIFF_TEXT").and_then(|v| parse_bool(&v)) {
            config.sniff_text = sniff;
        }

        if let Some(key) = var("OPENROUTER_API_KEY") {
            config.llm.api_key = Some(key);
        }

        if let Some(model) = var("DOCSUM_MODEL") {
            config.llm.model = model;
        }

        if let Some(url) = var("DOCSUM_LLM_BASE_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(secs) = var("DOCSUM_LLM_TIMEOUT_SECS") {
            if let Ok(secs) = secs.trim().parse::<u64>() {
                config.llm.timeout_secs = secs.max(1);
            }
        }

        if let Some(chars) = var("DOCSUM_ANALYSIS_MAX_CHARS") {
            if let Ok(chars) = chars.trim().parse() {
                config.llm.max_chars = chars;
            }
        }

        config
    }
}
