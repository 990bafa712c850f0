//! gesture-replay - run a recorded landmark script through the gesture
//! pipeline and print the resulting snapshots as JSON lines.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use gesture_pipeline::replay::ReplaySource;
use gesture_pipeline::{FrameScheduler, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "gesture-replay", about = "Replay recorded hand landmarks through the gesture pipeline")]
struct Cli {
    /// JSON-lines landmark script
    #[arg(long)]
    script: PathBuf,

    /// TOML config file (default: built-in tunables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every processed snapshot, not only triggers
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_pipeline=info,gesture_replay=info".into()),
        )
        .init();

    info!("gesture-replay v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    info!("config: {}", config.config_sexp());

    let file = File::open(&cli.script)
        .with_context(|| format!("opening script {}", cli.script.display()))?;
    let source = ReplaySource::from_reader(BufReader::new(file))?;
    info!("script: {} records", source.remaining());

    let mut scheduler = FrameScheduler::new(config, source)?;
    scheduler.start();

    let mut triggers = 0usize;
    while let Some(t_ms) = scheduler.source_mut().advance() {
        let snapshot = match scheduler.tick_at(t_ms, t_ms) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => continue,
            Err(e) => {
                warn!("frame at {:.1}ms skipped: {}", t_ms, e);
                continue;
            }
        };
        if snapshot.trigger.is_some() {
            triggers += 1;
        }
        if cli.verbose || snapshot.trigger.is_some() {
            println!("{}", serde_json::to_string(&snapshot)?);
        }
    }

    info!("replay finished: {} triggers", triggers);
    info!("stats: {}", scheduler.timing().stats_sexp());
    scheduler.stop();
    Ok(())
}
