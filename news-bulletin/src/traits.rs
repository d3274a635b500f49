use crate::types::{EncodeError, Result, Script};
use async_trait::async_trait;
use std::path::Path;

/// Retrieves the raw document behind a feed URL.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch the feed body (RSS/Atom XML) for `url`
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// A remote text-generation service.
///
/// Any `Err` is treated as a transport-level failure by the caller. A
/// successful HTTP exchange returns the decoded JSON body whatever its shape;
/// classifying that body is the caller's job.
#[async_trait]
pub trait TextGenerationBackend: Send + Sync {
    /// Human-readable name for logs
    fn backend_name(&self) -> String;

    /// Send one prompt and return the response body
    async fn request(&self, prompt: &str) -> Result<serde_json::Value>;
}

/// Turns text into encoded speech audio.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Synthesize `text` in `language` and return MP3 bytes
    async fn speak(&self, text: &str, language: &str) -> Result<Vec<u8>>;
}

/// Combines a still image and an audio track into a video file.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Encode `image` looped over `audio` into `output`
    async fn encode(&self, image: &Path, audio: &Path, output: &Path) -> std::result::Result<(), EncodeError>;
}

/// Delivers a finished bulletin somewhere.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Name of the destination for logs
    fn destination(&self) -> String;

    /// Send the script text followed by the video file
    async fn publish(&self, script: &Script, video: &Path) -> Result<()>;
}
