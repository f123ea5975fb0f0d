mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cybulde_core::{AppConfig, DEFAULT_CONFIG_PATH};
use cybulde_predict::PredictionOrchestrator;
use cybulde_store::{DatasetCache, DatasetSampler};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cybulde",
    version,
    about = "Cyberbullying detection: clean text, classify it, show the verdict"
)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, env = "CYBULDE_CONFIG", default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify your own text.
    Classify {
        /// Text to classify.
        text: String,
    },
    /// Classify random rows of the test dataset.
    Sample {
        /// Number of rows to draw [default: sample_size from config].
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Dataset to draw from instead of the configured one.
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Validate the configuration and print it.
    CheckConfig,
    /// Describe what the tool does.
    About,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("cybulde v{}", env!("CARGO_PKG_VERSION"));

    if cli.no_color {
        colored::control::set_override(false);
    }
    if let Commands::About = cli.command {
        print!("{}", display::render_about());
        return Ok(());
    }

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Classify { text } => classify(&config, &text).await,
        Commands::Sample { count, dataset } => {
            let path = dataset.unwrap_or_else(|| config.dataset_path.clone());
            let count = count.unwrap_or(config.sample_size);
            sample(&config, &path, count).await
        }
        Commands::CheckConfig => {
            println!("config: {}", cli.config.display());
            println!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
        Commands::About => Ok(()),
    }
}

fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    AppConfig::from_file(path).with_context(|| format!("loading config {}", path.display()))
}

async fn classify(config: &AppConfig, text: &str) -> anyhow::Result<()> {
    if text.is_empty() {
        eprintln!("Nothing to classify: pass the text you want to input to the model.");
        return Ok(());
    }

    let orchestrator =
        PredictionOrchestrator::from_config(config).context("building service clients")?;
    let prediction = orchestrator
        .classify(text)
        .await
        .context("classifying text")?;
    print!("{}", display::render_prediction(&prediction));
    Ok(())
}

async fn sample(config: &AppConfig, path: &Path, count: usize) -> anyhow::Result<()> {
    let sampler = DatasetSampler::new(Arc::new(DatasetCache::new()));
    let dataset = sampler
        .load(path)
        .with_context(|| format!("loading dataset {}", path.display()))?;
    eprintln!(
        "  Drawing {} of {} rows from {}",
        count.min(dataset.len()),
        dataset.len(),
        path.display()
    );

    let orchestrator =
        PredictionOrchestrator::from_config(config).context("building service clients")?;
    let items = orchestrator
        .classify_batch(sampler.sample(&dataset, count))
        .await;
    print!("{}", display::render_batch(&items));
    Ok(())
}
