//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use mosaic_core::{
    ConfigError, GrabConfig, DEFAULT_BASE_URL, DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_DIR,
    MAX_CONCURRENCY,
};
use mosaic_engine::FetchSettings;

/// Download every photo of a mosaic gallery profile.
#[derive(Parser, Debug)]
#[command(name = "mosaic-grab")]
#[command(author, version, about)]
pub struct Args {
    /// Profile to download
    #[arg(short, long)]
    pub username: Option<String>,

    /// Zip the images folder and remove it afterwards
    #[arg(short, long)]
    pub zip: bool,

    /// Where downloaded images are written
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Maximum concurrent downloads (1-64)
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_CONCURRENCY as u8,
        value_parser = clap::value_parser!(u8).range(1..=MAX_CONCURRENCY as i64)
    )]
    pub concurrency: u8,

    /// Site root the profile lives under
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Give up on any single request after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Increase output verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn grab_config(&self) -> Result<GrabConfig, ConfigError> {
        let username = self.username.as_deref().unwrap_or_default();
        let config = GrabConfig::new(username)?
            .with_base_url(&self.base_url)?
            .with_concurrency(usize::from(self.concurrency))?
            .with_output_dir(&self.output_dir)
            .with_zip(self.zip);
        config.validate()?;
        Ok(config)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            request_timeout: self.timeout.map(Duration::from_secs),
            ..FetchSettings::default()
        }
    }
}
