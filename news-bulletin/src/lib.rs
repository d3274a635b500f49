pub mod types;
pub mod traits;
pub mod config;
pub mod fetcher;
pub mod parser;
pub mod aggregator;
pub mod llm_adapter;
pub mod slide;
pub mod tts;
pub mod muxer;
pub mod publisher;
pub mod pipeline;
pub mod utils;

pub use types::*;
pub use traits::{Encoder, FeedFetcher, Publisher, SpeechBackend, TextGenerationBackend};
pub use config::{PipelineConfig, Secrets};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use aggregator::NewsAggregator;
pub use llm_adapter::{HuggingFaceBackend, ScriptGenerator};
pub use slide::SlideRenderer;
pub use tts::{AudioSynthesizer, GoogleTranslateTts};
pub use muxer::{FfmpegEncoder, VideoMuxer};
pub use publisher::TelegramPublisher;
pub use pipeline::{BulletinPipeline, PipelineBuilder, PipelineOutput};
