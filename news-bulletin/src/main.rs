use anyhow::Context;
use clap::Parser;
use news_bulletin::{
    AudioSynthesizer, FetchConfig, Fetcher, FfmpegEncoder, GoogleTranslateTts, HuggingFaceBackend, NewsAggregator,
    PipelineBuilder, PipelineConfig, ScriptGenerator, Secrets, TelegramPublisher, VideoMuxer,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Turn the latest RSS news into a narrated video bulletin.
#[derive(Debug, Parser)]
#[command(name = "news-bulletin", version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Directory for slide, audio and video (overrides the config file)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Skip delivery even if it is enabled in the config
    #[arg(long)]
    no_publish: bool,

    /// Debug-level logging unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // anyhow prints the error chain and exits non-zero
    run(cli).await?;

    println!("DONE");
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = PipelineConfig::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?
        .with_secrets(Secrets::from_env());
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }

    info!(
        "Starting news bulletin: {} sources, up to {} items each, output in {}",
        config.rss_sources.len(),
        config.max_news,
        config.output_dir.display()
    );

    let generation = config.generation_config();
    if generation.api_token.is_none() {
        warn!("HF_TOKEN is not set, generation requests will be unauthenticated");
    }

    let aggregator = NewsAggregator::new(Box::new(Fetcher::new(FetchConfig::default())?));
    let generator = ScriptGenerator::new(Box::new(HuggingFaceBackend::new(&generation)?), &generation)?;
    let synthesizer = AudioSynthesizer::new(
        Box::new(GoogleTranslateTts::new(config.speech.endpoint.clone())?),
        config.output_dir.clone(),
    )
    .with_language(config.speech.language.clone());
    let encoder = match &config.encoder.ffmpeg_path {
        Some(path) => FfmpegEncoder::with_path(path.clone()),
        None => FfmpegEncoder::new(),
    };
    let muxer = VideoMuxer::new(Box::new(encoder), config.output_dir.clone());

    let mut builder = PipelineBuilder::new(config.sources(), config.output_dir.clone())
        .aggregator(aggregator)
        .generator(generator)
        .synthesizer(synthesizer)
        .muxer(muxer);

    if config.telegram.enabled && !cli.no_publish {
        let publisher = TelegramPublisher::new(
            config.secrets.tg_bot_token.clone(),
            config.secrets.tg_chat_id.clone(),
        )
        .with_api_base(config.telegram.api_base.clone())
        .with_max_message_chars(config.telegram.max_message_chars)
        .with_timeout(config.telegram.timeout_seconds)?;
        builder = builder.publisher(Box::new(publisher));
    } else {
        info!("Delivery disabled");
    }

    let output = builder.build()?.run().await?;

    info!(
        "Slide: {}, audio: {}, video: {}",
        output.slide.display(),
        output.audio.display(),
        output.video.display()
    );
    if output.fallback_used {
        warn!("Bulletin was produced from the fallback script");
    }

    Ok(())
}
