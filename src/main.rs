//! Riskgate command-line entrypoint.
//!
//! `riskgate [--threshold N] [--no-hard-block] <frame>...` prints one JSON decision per frame.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use mimalloc::MiMalloc;

use riskgate::config::Config;
use riskgate::detector::HttpDetector;
use riskgate::engine::FusionEngine;
use riskgate::policy::PolicyStore;
use riskgate::reviewer::{OpenAiCompatBackend, ReviewerGateway};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Decides each frame and prints one JSON decision per line.
#[derive(Parser, Debug)]
#[command(name = "riskgate", version)]
struct Args {
    /// Block threshold overriding the per-category policy.
    #[arg(long)]
    threshold: Option<u32>,

    /// Skip the hard-block label check.
    #[arg(long)]
    no_hard_block: bool,

    /// Frame image paths.
    #[arg(required = true)]
    frames: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::from_env()?;
    config.validate()?;

    let detector = HttpDetector::new(config.require_detector_url()?, config.detector_timeout())?;
    let backend = OpenAiCompatBackend::new(config.backend_config())?;
    let gateway = ReviewerGateway::new(backend, config.gateway_config());
    if !gateway.is_enabled() {
        tracing::warn!("Semantic reviewer disabled; escalations will degrade to neutral evidence");
    }
    let policy = PolicyStore::load(&config.policy_path);

    tracing::info!(
        policy = %config.policy_path.display(),
        rules = policy.len(),
        frames = args.frames.len(),
        "Riskgate starting"
    );

    let engine = FusionEngine::new(
        Arc::new(detector),
        Arc::new(gateway),
        Arc::new(policy),
        config.engine_config(),
    );

    for frame in &args.frames {
        let decision = engine.decide(frame, args.threshold, !args.no_hard_block).await;
        println!("{}", serde_json::to_string(&decision)?);
    }

    Ok(())
}
