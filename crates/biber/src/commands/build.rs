//! `biber build` command implementation.

use std::path::PathBuf;
use std::time::Instant;

use biber_config::{CliSettings, Config};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;
use crate::site::SiteBuilder;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover biber.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Posts directory (overrides config).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Rebuild posts whose output is newer than the source.
    #[arg(short, long)]
    force: bool,

    /// Enable verbose output (log every built post).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// Returns an error if configuration fails or any post failed to build.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            input: self.input,
            output: self.output,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.build_settings(&config);

        let start = Instant::now();
        let report = SiteBuilder::new(&config).with_force(self.force).build()?;
        output.build_report(&report, start.elapsed())
    }
}
