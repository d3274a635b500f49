use crate::traits::Publisher;
use crate::types::{BulletinError, Result, Script};
use crate::utils::text::truncate_chars;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Text actually sent as the chat message.
pub fn message_text(script: &Script, max_chars: usize) -> &str {
    truncate_chars(script.as_str(), max_chars)
}

/// Telegram Bot API delivery: one text message, then one video upload.
#[derive(Clone)]
pub struct TelegramPublisher {
    client: Client,
    api_base: String,
    bot_token: Option<String>,
    chat_id: Option<String>,
    max_message_chars: usize,
}

impl TelegramPublisher {
    pub fn new(bot_token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: DEFAULT_TELEGRAM_API.to_string(),
            bot_token,
            chat_id,
            max_message_chars: MAX_MESSAGE_CHARS,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_message_chars(mut self, max_chars: usize) -> Self {
        self.max_message_chars = max_chars;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Result<Self> {
        self.client = Client::builder().timeout(Duration::from_secs(secs)).build()?;
        Ok(self)
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        let token = self
            .bot_token
            .as_deref()
            .ok_or_else(|| BulletinError::Publish("TG_BOT_TOKEN is not set".to_string()))?;
        let chat_id = self
            .chat_id
            .as_deref()
            .ok_or_else(|| BulletinError::Publish("TG_CHAT_ID is not set".to_string()))?;
        Ok((token, chat_id))
    }

    fn method_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, token, method)
    }

    async fn send_message(&self, token: &str, chat_id: &str, text: &str) -> Result<()> {
        self.client
            .post(self.method_url(token, "sendMessage"))
            .form(&[("chat_id", chat_id), ("text", text)])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| BulletinError::Publish(format!("sendMessage failed: {}", e.without_url())))?;
        Ok(())
    }

    async fn send_video(&self, token: &str, chat_id: &str, video: &Path) -> Result<()> {
        let bytes = tokio::fs::read(video).await?;
        let file_name = video
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "video.mp4".to_string());
        debug!("Uploading {} ({} bytes)", file_name, bytes.len());

        let part = Part::bytes(bytes).file_name(file_name).mime_str("video/mp4")?;
        let form = Form::new().text("chat_id", chat_id.to_string()).part("video", part);

        self.client
            .post(self.method_url(token, "sendVideo"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| BulletinError::Publish(format!("sendVideo failed: {}", e.without_url())))?;
        Ok(())
    }
}

#[async_trait]
impl Publisher for TelegramPublisher {
    fn destination(&self) -> String {
        match &self.chat_id {
            Some(chat_id) => format!("Telegram chat {}", chat_id),
            None => "Telegram (no chat configured)".to_string(),
        }
    }

    async fn publish(&self, script: &Script, video: &Path) -> Result<()> {
        let (token, chat_id) = self.credentials()?;

        let text = message_text(script, self.max_message_chars);
        // Transport errors would carry the token inside the request URL
        self.send_message(token, chat_id, text)
            .await
            .map_err(strip_url)?;
        self.send_video(token, chat_id, video).await.map_err(strip_url)?;

        info!("Bulletin delivered to {}", self.destination());
        Ok(())
    }
}

fn strip_url(error: BulletinError) -> BulletinError {
    match error {
        BulletinError::Http(e) => BulletinError::Http(e.without_url()),
        other => other,
    }
}
