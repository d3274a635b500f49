use crate::aggregator::NewsAggregator;
use crate::llm_adapter::ScriptGenerator;
use crate::muxer::VideoMuxer;
use crate::slide::SlideRenderer;
use crate::traits::Publisher;
use crate::tts::AudioSynthesizer;
use crate::types::{BulletinError, Result, Script, SourceList};
use std::path::PathBuf;
use tracing::{error, info};

/// Index of the only slide a bulletin has.
const SLIDE_INDEX: usize = 0;

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub script: Script,
    pub fallback_used: bool,
    pub news_count: usize,
    pub slide: PathBuf,
    pub audio: PathBuf,
    pub video: PathBuf,
    pub published: bool,
}

/// Runs the stages in fixed order: collect, generate, render, speak, mux, publish.
///
/// Only delivery failures are absorbed here. Any other stage error ends the
/// run; artifacts written before the failure are left in place.
pub struct BulletinPipeline {
    sources: SourceList,
    output_dir: PathBuf,
    aggregator: NewsAggregator,
    generator: ScriptGenerator,
    renderer: SlideRenderer,
    synthesizer: AudioSynthesizer,
    muxer: VideoMuxer,
    publisher: Option<Box<dyn Publisher>>,
}

impl BulletinPipeline {
    pub async fn run(&self) -> Result<PipelineOutput> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        info!("Collecting news from {} sources", self.sources.urls.len());
        let news = self.aggregator.collect_sources(&self.sources).await;

        let outcome = self.generator.generate(&news).await;
        let fallback_used = outcome.is_fallback();
        let script = outcome.into_script();

        let slide = self.renderer.render(&script, SLIDE_INDEX)?;
        let audio = self.synthesizer.synthesize(&script).await?;
        let video = self.muxer.mux(&slide, &audio).await?;

        let published = match &self.publisher {
            Some(publisher) => match publisher.publish(&script, &video).await {
                Ok(()) => true,
                Err(e) => {
                    error!("Failed to publish to {}: {}", publisher.destination(), e);
                    false
                }
            },
            None => false,
        };

        info!(
            "Bulletin ready: {} (fallback: {}, published: {})",
            video.display(),
            fallback_used,
            published
        );

        Ok(PipelineOutput {
            script,
            fallback_used,
            news_count: news.len(),
            slide,
            audio,
            video,
            published,
        })
    }
}

/// Pipeline builder for easier configuration
pub struct PipelineBuilder {
    sources: SourceList,
    output_dir: PathBuf,
    aggregator: Option<NewsAggregator>,
    generator: Option<ScriptGenerator>,
    synthesizer: Option<AudioSynthesizer>,
    muxer: Option<VideoMuxer>,
    renderer: Option<SlideRenderer>,
    publisher: Option<Box<dyn Publisher>>,
}

impl PipelineBuilder {
    pub fn new(sources: SourceList, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            sources,
            output_dir: output_dir.into(),
            aggregator: None,
            generator: None,
            synthesizer: None,
            muxer: None,
            renderer: None,
            publisher: None,
        }
    }

    pub fn aggregator(mut self, aggregator: NewsAggregator) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    pub fn generator(mut self, generator: ScriptGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn synthesizer(mut self, synthesizer: AudioSynthesizer) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn muxer(mut self, muxer: VideoMuxer) -> Self {
        self.muxer = Some(muxer);
        self
    }

    /// Defaults to a [`SlideRenderer`] writing into the output directory.
    pub fn renderer(mut self, renderer: SlideRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn publisher(mut self, publisher: Box<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn build(self) -> Result<BulletinPipeline> {
        let missing = |stage: &str| BulletinError::Config(format!("pipeline has no {}", stage));

        Ok(BulletinPipeline {
            aggregator: self.aggregator.ok_or_else(|| missing("news aggregator"))?,
            generator: self.generator.ok_or_else(|| missing("script generator"))?,
            synthesizer: self.synthesizer.ok_or_else(|| missing("audio synthesizer"))?,
            muxer: self.muxer.ok_or_else(|| missing("video muxer"))?,
            renderer: self
                .renderer
                .unwrap_or_else(|| SlideRenderer::new(self.output_dir.clone())),
            publisher: self.publisher,
            sources: self.sources,
            output_dir: self.output_dir,
        })
    }
}
