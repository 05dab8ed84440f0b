// src/main.rs
//
// Replays a directory of still frames through the classifier at the configured
// frame rate and prints every event as it is published.

use anyhow::{Context, Result};
use aura_vision::config::PipelineConfig;
use aura_vision::frame_source::{ImageSequenceSource, paced};
use aura_vision::pipeline::AuraEvent;
use aura_vision::service::AuraService;
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "aura_vision", version, about = "Garment color classifier for a frame sequence")]
struct Args {
    /// Directory of frames, replayed in file-name order
    frames_dir: PathBuf,

    /// Configuration file (defaults to ./aura.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the replay rate
    #[arg(long)]
    fps: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aura_vision=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = PipelineConfig::discover(args.config.as_deref()).context("loading configuration")?;
    if let Some(fps) = args.fps {
        config.frames_per_second = fps;
        config.validate()?;
    }
    info!(
        width = config.frame_width,
        height = config.frame_height,
        fps = config.frames_per_second,
        debounce_ms = config.debounce_ms,
        "configuration ready"
    );

    let source = ImageSequenceSource::open(&args.frames_dir, &config)
        .with_context(|| format!("opening {}", args.frames_dir.display()))?;
    if source.remaining() == 0 {
        warn!(directory = %args.frames_dir.display(), "no frames to replay");
        return Ok(());
    }

    let mut service = AuraService::new(config.clone());
    let mut events = service.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "printer fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let summary = service.run(paced(source, config.frame_interval())).await?;
    println!("{}", service.pipeline().diagnostics());
    drop(service);
    printer.await?;

    info!(
        frames = summary.frames_analysed,
        skipped = summary.frames_unavailable,
        events = summary.events_published,
        "replay complete"
    );
    Ok(())
}

fn print_event(event: &AuraEvent) {
    match event {
        AuraEvent::PresenceChanged { active: true } => println!("presence: arrived"),
        AuraEvent::PresenceChanged { active: false } => println!("presence: departed"),
        AuraEvent::HueUpdated { degrees } => println!("hue: {degrees:.1}°"),
        AuraEvent::ZoneChanged { name, hex } => println!("zone: {name} {hex}"),
    }
}
