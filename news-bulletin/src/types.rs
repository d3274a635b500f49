use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
// Use the interfaces crate for core types
pub use interfaces::defs::{
    AttemptOutcome, GenerationAttempt, GenerationOutcome, NewsItem, Script, SourceList, UNKNOWN_SOURCE,
};

pub const DEFAULT_GENERATION_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct";

pub const DEFAULT_FALLBACK_TEXT: &str =
    "Извините, сегодня выпуск новостей подготовить не удалось. Мы вернёмся с новостями в следующем выпуске.";

/// Settings for the HTTP feed fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "News-Bulletin/1.0".to_string(),
            timeout_seconds: 30,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

/// Settings for the text-generation call and its retry loop.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub max_new_tokens: u32,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub fallback_text: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GENERATION_ENDPOINT.to_string(),
            api_token: None,
            max_new_tokens: 700,
            timeout: Duration::from_secs(60),
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
            fallback_text: DEFAULT_FALLBACK_TEXT.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to start encoder {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("encoder exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("encoder produced no output at {}", path.display())]
    MissingOutput { path: PathBuf },
}

#[derive(Debug, thiserror::Error)]
pub enum BulletinError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Font error: {0}")]
    Font(#[from] ab_glyph::InvalidFont),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Feed size exceeds limit: {size_mb}MB")]
    FeedTooLarge { size_mb: usize },

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, BulletinError>;
