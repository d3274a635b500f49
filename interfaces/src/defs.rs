use serde::{Deserialize, Serialize};
use std::fmt;

/// Source name used when a feed does not carry a title.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// One news record as collected from a feed entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub source: String,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, summary: Option<String>, source: Option<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.unwrap_or_default(),
            source: source.unwrap_or_else(|| UNKNOWN_SOURCE.to_owned()),
        }
    }
}

/// Feed endpoints to read, in order, with a per-feed item cap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceList {
    pub urls: Vec<String>,
    pub limit: usize,
}

/// The consolidated bulletin text. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script(String);

impl Script {
    /// Returns `None` for empty or whitespace-only text.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Script {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a single request to the text-generation service produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(String),
    /// Transport failure or an error reported by the service.
    Retriable(String),
    /// A response matching none of the known shapes.
    Malformed,
}

/// Transient record of one request inside the retry loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationAttempt {
    /// 1-based.
    pub index: u32,
    pub outcome: AttemptOutcome,
}

/// Terminal state of script generation. Both variants carry a usable script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationOutcome {
    Done(Script),
    Fallback(Script),
}

impl GenerationOutcome {
    pub fn script(&self) -> &Script {
        match self {
            GenerationOutcome::Done(script) | GenerationOutcome::Fallback(script) => script,
        }
    }

    pub fn into_script(self) -> Script {
        match self {
            GenerationOutcome::Done(script) | GenerationOutcome::Fallback(script) => script,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, GenerationOutcome::Fallback(_))
    }
}
