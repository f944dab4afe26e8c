use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use musemap_server::config::{AppConfig, CliConfig, FileConfig, DEFAULT_MODEL_NAME};
use musemap_server::creations::{spawn_retention_task, CreationStore, SqliteCreationStore};
use musemap_server::generation::{
    AudioBackend, Generator, HttpTextToAudio, TextToAudio, WavFileSink,
};
use musemap_server::graph_store::{populate, GraphStore, NodeLabel, SqliteGraphStore};
use musemap_server::server::{
    self, run_server, Generators, RequestsLoggingLevel, ServerConfig, ServerState,
};
use musemap_server::theory::build_catalog;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding graph.db and creations.db.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Directory for generated WAV files. Defaults to <db-dir>/generated_audio.
    #[clap(long, value_parser = parse_path)]
    pub audio_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// URL of the text-to-audio model server. Without it every request uses
    /// the fallback synthesizer.
    #[clap(long)]
    pub model_url: Option<String>,

    /// Model identifier forwarded to the model server.
    #[clap(long, default_value = DEFAULT_MODEL_NAME)]
    pub model_name: String,

    /// Timeout in seconds for model generation requests.
    #[clap(long, default_value_t = 300)]
    pub model_timeout_sec: u64,

    /// Upper bound applied to requested durations, in seconds.
    #[clap(long, default_value_t = 30)]
    pub max_duration_sec: u32,

    /// Sample rate of the fallback synthesizer.
    #[clap(long, default_value_t = 32000)]
    pub fallback_sample_rate: u32,

    /// Number of days to keep creations and their audio. Set to 0 to disable pruning.
    #[clap(long, default_value_t = 7)]
    pub audio_retention_days: u64,

    /// Interval in hours between pruning runs. Only used if audio_retention_days > 0.
    #[clap(long, default_value_t = 24)]
    pub prune_interval_hours: u64,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            audio_dir: self.audio_dir.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            model_url: self.model_url.clone(),
            model_name: self.model_name.clone(),
            model_timeout_sec: self.model_timeout_sec,
            max_duration_sec: self.max_duration_sec,
            fallback_sample_rate: self.fallback_sample_rate,
            audio_retention_days: self.audio_retention_days,
            prune_interval_hours: self.prune_interval_hours,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    std::fs::create_dir_all(&config.audio_dir)
        .with_context(|| format!("Failed to create audio directory {:?}", config.audio_dir))?;

    info!("Opening theory graph at {:?}...", config.graph_db_path());
    let graph_store = SqliteGraphStore::new(config.graph_db_path())?;
    let summary = populate(&graph_store, &build_catalog())?;
    info!(
        "Theory graph populated: {} new nodes, {} new links",
        summary.created_nodes, summary.linked_edges
    );

    info!("Initializing metrics...");
    server::metrics::init_metrics();
    let mut node_counts = Vec::new();
    for label in NodeLabel::ALL {
        node_counts.push((label.as_str(), graph_store.count_nodes(Some(label))?));
    }
    server::metrics::init_graph_metrics(&node_counts);

    let creation_store = Arc::new(SqliteCreationStore::new(config.creations_db_path())?);
    server::metrics::set_creations_count(creation_store.count_creations()?);

    let model: Option<Arc<dyn TextToAudio>> = match &config.model {
        Some(settings) => {
            info!("Model server configured at {}", settings.url);
            Some(Arc::new(HttpTextToAudio::new(
                &settings.url,
                &settings.name,
                settings.timeout_sec,
            )?) as Arc<dyn TextToAudio>)
        }
        None => {
            info!("No model server configured, using the fallback synthesizer");
            None
        }
    };
    let backend = AudioBackend::select(model).await;
    info!("Audio backend: {:?}", backend);

    let sink = Arc::new(WavFileSink::new(&config.audio_dir));
    let generators = Generators {
        configured: Generator::new(backend, sink.clone())
            .with_limits(config.max_duration_sec, config.fallback_sample_rate),
        fallback: Generator::fallback_only(sink)
            .with_limits(config.max_duration_sec, config.fallback_sample_rate),
    };

    spawn_retention_task(
        creation_store.clone(),
        config.audio_dir.clone(),
        config.audio_retention_days,
        config.prune_interval_hours,
    );

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level.clone(),
        port: config.port,
        metrics_port: config.metrics_port,
        audio_dir: config.audio_dir.clone(),
    };
    let graph_store: Arc<dyn GraphStore> = Arc::new(graph_store);
    let state = ServerState::new(
        server_config,
        graph_store,
        creation_store,
        generators,
        env!("GIT_HASH"),
    );

    run_server(state).await
}
