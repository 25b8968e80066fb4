use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tiny_ecs::{
    app::{AppBuilder, RunSummary},
    config::ConfigLoader,
    systems::{FrameStatsSystem, InputSystem, ScrollEvent},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless tiny-ecs application runner")]
struct Cli {
    /// Path to the application YAML config
    #[arg(long, default_value = "config/demo.yaml")]
    config: PathBuf,

    /// Override the frame limit (uses the config value when omitted)
    #[arg(long)]
    frames: Option<u64>,

    /// Log filter, e.g. `debug` or `tiny_ecs=trace` (beats RUST_LOG and the config)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConfigLoader::new(".").load(&cli.config)?;
    init_logging(cli.log_level.as_deref(), &config.logging.level)?;

    let mut app = AppBuilder::new(config.settings())
        .with_system(InputSystem::with_script(config.input.clone()))
        .with_system(FrameStatsSystem::new(config.stats.interval_frames))
        .build();
    app.init()?;
    app.events_mut()?.on(|event: &ScrollEvent| {
        info!(
            dx = event.dx,
            dy = event.dy,
            scroll_x = event.scroll_x,
            scroll_y = event.scroll_y,
            "scroll"
        );
    });

    let summary = app.run(config.frames(cli.frames))?;
    report(&summary, cli.json)
}

fn init_logging(cli_level: Option<&str>, config_level: &str) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(config_level))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn report(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!(
            "'{}' ran {} frames in {:.3}s (mean {:.3} ms/frame). Scroll position: ({}, {})",
            summary.name,
            summary.frames,
            summary.elapsed_secs,
            summary.mean_frame_ms,
            summary.scroll_x,
            summary.scroll_y
        );
    }
    Ok(())
}
