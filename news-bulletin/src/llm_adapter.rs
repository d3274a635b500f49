use crate::traits::TextGenerationBackend;
use crate::types::{
    AttemptOutcome, BulletinError, GenerationAttempt, GenerationConfig, GenerationOutcome, NewsItem, Result,
    Script, DEFAULT_FALLBACK_TEXT,
};
use async_trait::async_trait;
use backoff::backoff::{Backoff, Constant};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

const PROMPT_HEADER: &str = "Ты редактор финансовых новостей.
Составь краткий новостной выпуск для озвучивания, на 3–5 минут.
Без прогнозов и без советов.
Только факты.

Новости:
";

const NO_NEWS: &str = "(новостей нет)";

/// Build the generation prompt for a batch of news.
pub fn build_prompt(news: &[NewsItem]) -> String {
    let mut prompt = String::from(PROMPT_HEADER);

    if news.is_empty() {
        prompt.push_str(NO_NEWS);
        prompt.push('\n');
        return prompt;
    }

    for (i, item) in news.iter().enumerate() {
        // Writing to a String cannot fail
        let _ = write!(prompt, "{}. [{}] {}", i + 1, item.source, item.title);
        if !item.summary.is_empty() {
            let _ = write!(prompt, ": {}", item.summary);
        }
        prompt.push('\n');
    }

    prompt
}

/// Classify a response body from the text-generation service.
///
/// Accepted success shapes are `[{"generated_text": ...}, ...]` and
/// `{"generated_text": ...}`. An object with an `error` key is retriable.
/// Anything else, including blank generated text, is malformed.
pub fn classify_response(body: &Value) -> AttemptOutcome {
    if let Some(error) = body.get("error") {
        let reason = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return AttemptOutcome::Retriable(reason);
    }

    let candidate = match body {
        Value::Array(items) => items.first(),
        Value::Object(_) => Some(body),
        _ => None,
    };

    match candidate
        .and_then(|c| c.get("generated_text"))
        .and_then(Value::as_str)
    {
        Some(text) if !text.trim().is_empty() => AttemptOutcome::Success(text.to_string()),
        _ => AttemptOutcome::Malformed,
    }
}

enum GenerationState {
    Attempting(u32),
    Done(Script),
    Fallback,
}

/// Condenses news into a bulletin script through a remote model.
///
/// Makes up to `max_attempts` requests with a fixed delay after each
/// retriable failure. When every attempt fails the fixed fallback script is
/// returned instead, so generation never fails outright.
pub struct ScriptGenerator {
    backend: Box<dyn TextGenerationBackend>,
    max_attempts: u32,
    retry_delay: Duration,
    fallback: Script,
}

impl ScriptGenerator {
    pub fn new(backend: Box<dyn TextGenerationBackend>, config: &GenerationConfig) -> Result<Self> {
        if config.max_attempts == 0 {
            return Err(BulletinError::Config("max_attempts must be at least 1".to_string()));
        }

        let fallback = Script::new(config.fallback_text.clone())
            .or_else(|| Script::new(DEFAULT_FALLBACK_TEXT))
            .ok_or_else(|| BulletinError::Config("fallback text must not be empty".to_string()))?;

        Ok(Self {
            backend,
            max_attempts: config.max_attempts,
            retry_delay: config.retry_delay,
            fallback,
        })
    }

    pub fn fallback_script(&self) -> &Script {
        &self.fallback
    }

    pub async fn generate(&self, news: &[NewsItem]) -> GenerationOutcome {
        self.generate_with_history(news).await.0
    }

    /// Like [`generate`](Self::generate), also returning every attempt made.
    pub async fn generate_with_history(&self, news: &[NewsItem]) -> (GenerationOutcome, Vec<GenerationAttempt>) {
        let prompt = build_prompt(news);
        let mut delay = Constant::new(self.retry_delay);
        let mut history = Vec::new();
        let mut state = GenerationState::Attempting(1);

        info!(
            "Generating script from {} news items via {}",
            news.len(),
            self.backend.backend_name()
        );

        loop {
            state = match state {
                GenerationState::Attempting(index) => {
                    let outcome = self.attempt(&prompt).await;
                    history.push(GenerationAttempt {
                        index,
                        outcome: outcome.clone(),
                    });

                    match outcome {
                        AttemptOutcome::Success(text) => match Script::new(text) {
                            Some(script) => GenerationState::Done(script),
                            None => self.next_state(index),
                        },
                        AttemptOutcome::Retriable(reason) => {
                            warn!("Generation attempt {}/{} failed: {}", index, self.max_attempts, reason);
                            let next = self.next_state(index);
                            if matches!(next, GenerationState::Attempting(_)) {
                                if let Some(wait) = delay.next_backoff() {
                                    debug!("Retrying generation in {:?}", wait);
                                    tokio::time::sleep(wait).await;
                                }
                            }
                            next
                        }
                        AttemptOutcome::Malformed => {
                            debug!("Generation attempt {} returned an unrecognised response", index);
                            self.next_state(index)
                        }
                    }
                }
                GenerationState::Done(script) => {
                    info!("Script generated ({} chars)", script.as_str().chars().count());
                    return (GenerationOutcome::Done(script), history);
                }
                GenerationState::Fallback => {
                    warn!(
                        "Generation failed after {} attempts, using fallback script",
                        history.len()
                    );
                    return (GenerationOutcome::Fallback(self.fallback.clone()), history);
                }
            };
        }
    }

    fn next_state(&self, index: u32) -> GenerationState {
        if index >= self.max_attempts {
            GenerationState::Fallback
        } else {
            GenerationState::Attempting(index + 1)
        }
    }

    async fn attempt(&self, prompt: &str) -> AttemptOutcome {
        match self.backend.request(prompt).await {
            Ok(body) => classify_response(&body),
            Err(e) => AttemptOutcome::Retriable(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
}

/// Hugging Face Inference API backend.
pub struct HuggingFaceBackend {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
    max_new_tokens: u32,
}

impl HuggingFaceBackend {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
            max_new_tokens: config.max_new_tokens,
        })
    }
}

#[async_trait]
impl TextGenerationBackend for HuggingFaceBackend {
    fn backend_name(&self) -> String {
        format!("Hugging Face ({})", self.endpoint)
    }

    async fn request(&self, prompt: &str) -> Result<Value> {
        let body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: self.max_new_tokens,
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("Generation endpoint answered {} ({} bytes)", status, text.len());

        match serde_json::from_str(&text) {
            Ok(body) => Ok(body),
            // Gateway error pages count as transport failures
            Err(_) if !status.is_success() => Err(BulletinError::General(format!("HTTP {}", status))),
            // Kept as a string so it classifies as malformed
            Err(_) => Ok(Value::String(text)),
        }
    }
}
