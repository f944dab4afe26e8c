//! Generates a single clip from the command line, without the HTTP server.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use musemap_server::config::DEFAULT_MODEL_NAME;
use musemap_server::generation::{
    build_prompt, AudioBackend, GenerationRequest, Generator, HttpTextToAudio, TextToAudio,
    WavFileSink, DEFAULT_MAX_DURATION_SEC, DEFAULT_SAMPLE_RATE,
};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Musical key, e.g. "C major".
    #[clap(long)]
    pub key: String,

    /// Instrument to feature. May be repeated.
    #[clap(long = "instrument")]
    pub instruments: Vec<String>,

    #[clap(long)]
    pub mood: String,

    #[clap(long)]
    pub genre: String,

    /// Optional chord progression, e.g. "C-G-Am-F".
    #[clap(long)]
    pub chords: Option<String>,

    /// Tempo in BPM.
    #[clap(long, default_value_t = 120)]
    pub tempo: i64,

    /// Duration in seconds. Clamped to --max-duration-sec.
    #[clap(long, default_value_t = 10)]
    pub duration: u32,

    #[clap(long, default_value_t = DEFAULT_MAX_DURATION_SEC)]
    pub max_duration_sec: u32,

    /// Directory the WAV file is written to.
    #[clap(long, default_value = "generated_audio")]
    pub output_dir: PathBuf,

    /// URL of the text-to-audio model server. Omit to use the fallback synthesizer.
    #[clap(long)]
    pub model_url: Option<String>,

    #[clap(long, default_value = DEFAULT_MODEL_NAME)]
    pub model_name: String,

    #[clap(long, default_value_t = 300)]
    pub model_timeout_sec: u64,

    /// Print the prompt and exit without generating audio.
    #[clap(long)]
    pub dry_run: bool,
}

impl CliArgs {
    fn to_request(&self) -> GenerationRequest {
        GenerationRequest {
            key: self.key.clone(),
            instruments: self.instruments.clone(),
            mood: self.mood.clone(),
            genre: self.genre.clone(),
            chords: self.chords.clone(),
            tempo: self.tempo,
            duration: self.duration,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let request = cli_args.to_request();
    request.validate()?;

    if cli_args.dry_run {
        println!("{}", build_prompt(&request));
        return Ok(());
    }

    let model = match &cli_args.model_url {
        Some(url) => Some(Arc::new(HttpTextToAudio::new(
            url,
            &cli_args.model_name,
            cli_args.model_timeout_sec,
        )?) as Arc<dyn TextToAudio>),
        None => None,
    };
    let backend = AudioBackend::select(model).await;

    let sink = Arc::new(WavFileSink::new(&cli_args.output_dir));
    let generator = Generator::new(backend, sink)
        .with_limits(cli_args.max_duration_sec.max(1), DEFAULT_SAMPLE_RATE);

    let audio = generator.generate(&request).await?;
    println!("{}", serde_json::to_string_pretty(&audio)?);
    Ok(())
}
