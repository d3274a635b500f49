use crate::publisher::{DEFAULT_TELEGRAM_API, MAX_MESSAGE_CHARS};
use crate::tts::{DEFAULT_LANGUAGE, DEFAULT_TTS_ENDPOINT};
use crate::types::{
    BulletinError, GenerationConfig, Result, SourceList, DEFAULT_FALLBACK_TEXT, DEFAULT_GENERATION_ENDPOINT,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const HF_TOKEN_VAR: &str = "HF_TOKEN";
pub const TG_BOT_TOKEN_VAR: &str = "TG_BOT_TOKEN";
pub const TG_CHAT_ID_VAR: &str = "TG_CHAT_ID";

/// Static settings for one run, read once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub rss_sources: Vec<String>,
    pub max_news: usize,
    pub telegram: TelegramSettings,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub speech: SpeechSettings,
    #[serde(default)]
    pub encoder: EncoderSettings,
    #[serde(skip)]
    pub secrets: Secrets,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    pub enabled: bool,
    #[serde(default = "default_telegram_api")]
    pub api_base: String,
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    /// Upload timeout for the video request.
    #[serde(default = "default_telegram_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub endpoint: String,
    pub max_new_tokens: u32,
    pub timeout_seconds: u64,
    pub max_attempts: u32,
    pub retry_delay_seconds: u64,
    pub fallback_text: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GENERATION_ENDPOINT.to_string(),
            max_new_tokens: 700,
            timeout_seconds: 60,
            max_attempts: 3,
            retry_delay_seconds: 5,
            fallback_text: DEFAULT_FALLBACK_TEXT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub language: String,
    pub endpoint: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            endpoint: DEFAULT_TTS_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// Resolved from PATH when unset.
    pub ffmpeg_path: Option<String>,
}

/// Credentials taken from the environment, never from the config file.
#[derive(Clone, Default)]
pub struct Secrets {
    pub hf_token: Option<String>,
    pub tg_bot_token: Option<String>,
    pub tg_chat_id: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("hf_token", &self.hf_token.as_ref().map(|_| "***"))
            .field("tg_bot_token", &self.tg_bot_token.as_ref().map(|_| "***"))
            .field("tg_chat_id", &self.tg_chat_id)
            .finish()
    }
}

impl Secrets {
    /// Read secrets from the process environment, after loading `.env` if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            hf_token: get(HF_TOKEN_VAR),
            tg_bot_token: get(TG_BOT_TOKEN_VAR),
            tg_chat_id: get(TG_CHAT_ID_VAR),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_telegram_api() -> String {
    DEFAULT_TELEGRAM_API.to_string()
}

fn default_max_message_chars() -> usize {
    MAX_MESSAGE_CHARS
}

fn default_telegram_timeout() -> u64 {
    120
}

impl PipelineConfig {
    /// Load and validate a TOML config file. Secrets are left empty.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BulletinError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| BulletinError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_secrets(mut self, secrets: Secrets) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for source in &self.rss_sources {
            let url = Url::parse(source)
                .map_err(|e| BulletinError::Config(format!("invalid feed URL '{}': {}", source, e)))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(BulletinError::Config(format!(
                    "feed URL '{}' must use http or https",
                    source
                )));
            }
        }

        if self.generation.max_attempts == 0 {
            return Err(BulletinError::Config("generation.max_attempts must be at least 1".to_string()));
        }

        Ok(())
    }

    pub fn sources(&self) -> SourceList {
        SourceList {
            urls: self.rss_sources.clone(),
            limit: self.max_news,
        }
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            endpoint: self.generation.endpoint.clone(),
            api_token: self.secrets.hf_token.clone(),
            max_new_tokens: self.generation.max_new_tokens,
            timeout: Duration::from_secs(self.generation.timeout_seconds),
            max_attempts: self.generation.max_attempts,
            retry_delay: Duration::from_secs(self.generation.retry_delay_seconds),
            fallback_text: self.generation.fallback_text.clone(),
        }
    }
}
