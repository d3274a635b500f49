#![allow(dead_code)]

use async_trait::async_trait;
use news_bulletin::{
    BulletinError, EncodeError, Encoder, FeedFetcher, Publisher, Result, Script, SpeechBackend,
    TextGenerationBackend,
};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

pub mod http;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const FEED_URL: &str = "https://news.example.com/rss.xml";
pub const SECOND_FEED_URL: &str = "https://markets.example.com/feed.xml";
pub const BROKEN_FEED_URL: &str = "https://down.example.com/rss.xml";

pub fn rss_feed(title: Option<&str>, entries: &[(&str, Option<&str>)]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel>"#);
    if let Some(title) = title {
        xml.push_str(&format!("<title>{}</title>", title));
    }
    xml.push_str("<link>https://news.example.com/</link><description>Test feed</description>");
    for (i, (entry_title, summary)) in entries.iter().enumerate() {
        xml.push_str("<item>");
        xml.push_str(&format!("<title>{}</title>", entry_title));
        xml.push_str(&format!("<link>https://news.example.com/{}</link>", i));
        xml.push_str(&format!("<guid>https://news.example.com/{}</guid>", i));
        if let Some(summary) = summary {
            xml.push_str(&format!("<description>{}</description>", summary));
        }
        xml.push_str("</item>");
    }
    xml.push_str("</channel></rss>");
    xml
}

/// Serves canned feed bodies; unknown URLs fail like an unreachable host.
#[derive(Default)]
pub struct InMemoryFetcher {
    feeds: HashMap<String, String>,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, url: &str, body: String) -> Self {
        self.feeds.insert(url.to_string(), body);
        self
    }
}

#[async_trait]
impl FeedFetcher for InMemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.feeds
            .get(url)
            .cloned()
            .ok_or_else(|| BulletinError::General(format!("connection refused: {}", url)))
    }
}

/// Replays scripted responses in order. When the script runs out, the last
/// response repeats.
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<std::result::Result<Value, String>>>,
    last: Mutex<Option<std::result::Result<Value, String>>>,
    pub calls: Arc<AtomicUsize>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<std::result::Result<Value, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn always(response: std::result::Result<Value, String>) -> Self {
        Self::new(vec![response])
    }
}

#[async_trait]
impl TextGenerationBackend for ScriptedBackend {
    fn backend_name(&self) -> String {
        "scripted".to_string()
    }

    async fn request(&self, prompt: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let next = self.responses.lock().unwrap().pop_front();
        let response = match next {
            Some(response) => {
                *self.last.lock().unwrap() = Some(response.clone());
                response
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err("no scripted response".to_string())),
        };
        response.map_err(BulletinError::General)
    }
}

/// "Speaks" by returning a fake MP3 header followed by the text bytes.
#[derive(Default)]
pub struct EchoSpeech {
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl SpeechBackend for EchoSpeech {
    async fn speak(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push((text.to_string(), language.to_string()));
        let mut audio = b"ID3".to_vec();
        audio.extend_from_slice(text.as_bytes());
        Ok(audio)
    }
}

pub struct UnreachableSpeech;

#[async_trait]
impl SpeechBackend for UnreachableSpeech {
    async fn speak(&self, _text: &str, _language: &str) -> Result<Vec<u8>> {
        Err(BulletinError::Synthesis("speech backend unreachable".to_string()))
    }
}

/// Writes the slide bytes followed by the audio bytes as the "video".
#[derive(Default)]
pub struct ConcatEncoder {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Encoder for ConcatEncoder {
    async fn encode(&self, image: &Path, audio: &Path, output: &Path) -> std::result::Result<(), EncodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut video = std::fs::read(image).map_err(spawn_error)?;
        video.extend(std::fs::read(audio).map_err(spawn_error)?);
        std::fs::write(output, video).map_err(spawn_error)?;
        Ok(())
    }
}

fn spawn_error(source: std::io::Error) -> EncodeError {
    EncodeError::Spawn {
        program: "concat".to_string(),
        source,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub text: String,
    pub video: PathBuf,
    pub video_bytes: usize,
}

/// Records deliveries, truncating text the way the Telegram publisher does.
#[derive(Default)]
pub struct RecordingPublisher {
    pub deliveries: Arc<Mutex<Vec<Delivery>>>,
}

#[async_trait]
impl Publisher for RecordingPublisher {
    fn destination(&self) -> String {
        "recording".to_string()
    }

    async fn publish(&self, script: &Script, video: &Path) -> Result<()> {
        let video_bytes = std::fs::metadata(video)?.len() as usize;
        let text = news_bulletin::publisher::message_text(script, news_bulletin::publisher::MAX_MESSAGE_CHARS);
        self.deliveries.lock().unwrap().push(Delivery {
            text: text.to_string(),
            video: video.to_path_buf(),
            video_bytes,
        });
        Ok(())
    }
}

pub struct FailingPublisher;

#[async_trait]
impl Publisher for FailingPublisher {
    fn destination(&self) -> String {
        "nowhere".to_string()
    }

    async fn publish(&self, _script: &Script, _video: &Path) -> Result<()> {
        Err(BulletinError::Publish("chat not found".to_string()))
    }
}
