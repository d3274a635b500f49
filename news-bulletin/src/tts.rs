use crate::traits::SpeechBackend;
use crate::types::{BulletinError, Result, Script};
use crate::utils::text::split_chunks;
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";
pub const DEFAULT_LANGUAGE: &str = "ru";
pub const AUDIO_FILE_NAME: &str = "audio.mp3";

/// Longest text the Google endpoint accepts per request.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Writes the spoken version of a script to `audio.mp3`.
pub struct AudioSynthesizer {
    backend: Box<dyn SpeechBackend>,
    output_dir: PathBuf,
    language: String,
}

impl AudioSynthesizer {
    pub fn new(backend: Box<dyn SpeechBackend>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            output_dir: output_dir.into(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn audio_path(&self) -> PathBuf {
        self.output_dir.join(AUDIO_FILE_NAME)
    }

    /// Synthesize the full script. Failures are not retried.
    pub async fn synthesize(&self, script: &Script) -> Result<PathBuf> {
        let audio = self.backend.speak(script.as_str(), &self.language).await?;
        if audio.is_empty() {
            return Err(BulletinError::Synthesis("speech backend returned no audio".to_string()));
        }

        let path = self.audio_path();
        tokio::fs::write(&path, &audio).await?;
        info!("Audio written to {} ({} bytes)", path.display(), audio.len());
        Ok(path)
    }
}

/// Google Translate text-to-speech.
///
/// Text is sent in chunks of at most [`MAX_CHUNK_CHARS`]; the MP3 responses
/// are concatenated in order.
pub struct GoogleTranslateTts {
    client: Client,
    endpoint: String,
}

impl GoogleTranslateTts {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0")
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    async fn speak_chunk(&self, chunk: &str, language: &str, index: usize, total: usize) -> Result<Vec<u8>> {
        let total = total.to_string();
        let idx = index.to_string();
        let textlen = chunk.chars().count().to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", language),
                ("client", "tw-ob"),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BulletinError::Synthesis(format!(
                "TTS chunk {} rejected with HTTP {}",
                index, status
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SpeechBackend for GoogleTranslateTts {
    async fn speak(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let chunks = split_chunks(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(BulletinError::Synthesis("nothing to speak".to_string()));
        }

        debug!("Synthesizing {} chunks in '{}'", chunks.len(), language);

        let mut audio = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            let bytes = self.speak_chunk(chunk, language, index, chunks.len()).await?;
            audio.extend_from_slice(&bytes);
        }
        Ok(audio)
    }
}
