mod cli;
mod progress;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use engine_logging::{engine_error, engine_info, level_for_verbosity};
use mosaic_core::{ConfigError, GrabConfig, RunSummary};
use mosaic_engine::{create_archive, remove_output_dir, Engine, FetchSettings};

use cli::Args;
use progress::ConsoleProgress;

fn main() -> ExitCode {
    let started = Instant::now();
    let args = Args::parse();
    engine_logging::initialize(level_for_verbosity(args.verbose, args.quiet));

    let config = match args.grab_config() {
        Ok(config) => config,
        Err(ConfigError::MissingUsername) => {
            eprintln!("Please provide an username");
            eprintln!("usage: mosaic-grab --username <NAME> [--zip]");
            return ExitCode::from(1);
        }
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(1);
        }
    };

    let code = match run(config, args.fetch_settings()) {
        Ok(summary) => {
            println!(
                "saved {} images, {} failed",
                summary.images_saved, summary.images_failed
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            engine_error!("{err:#}");
            ExitCode::from(1)
        }
    };

    println!("elapsed time: {:.2} seconds", started.elapsed().as_secs_f64());
    code
}

fn run(config: GrabConfig, settings: FetchSettings) -> Result<RunSummary> {
    let engine = Engine::new(config, settings);
    let config = engine.config();

    let summary = engine
        .run(Arc::new(ConsoleProgress))
        .with_context(|| format!("could not grab profile {}", config.username()))?;
    engine_info!("{summary}");

    if config.zip() {
        let archive = config.archive_path()?;
        create_archive(config.output_dir(), &archive).context("Could not create zip image file")?;
        remove_output_dir(config.output_dir(), &archive)
            .context("Could not remove images folder")?;
    }
    Ok(summary)
}
