//! CLI for the vgrab media download orchestrator.

mod commands;
mod console;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vgrab_core::config;

use commands::{run_fetch, run_probe, run_sweep};

/// Top-level CLI for the vgrab media download orchestrator.
#[derive(Debug, Parser)]
#[command(name = "vgrab")]
#[command(about = "vgrab: media download orchestrator around an external extraction tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download one media URL through the full pipeline and place the
    /// resulting file in the output directory.
    Fetch {
        /// Video page URL (TikTok, YouTube Shorts, Reels, or anything the
        /// extraction tool understands).
        url: String,

        /// Where the delivered file is placed (default: current directory).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Print the media duration in seconds without downloading.
    Probe {
        /// Video page URL.
        url: String,
    },

    /// Delete stale files from the artifact directory now.
    Sweep {
        /// Override the configured retention window, in seconds.
        #[arg(long, value_name = "SECS")]
        retention_secs: Option<u64>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch { url, output_dir } => {
                let output_dir = match output_dir {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                run_fetch(&cfg, &url, &output_dir).await?;
            }
            CliCommand::Probe { url } => run_probe(&cfg, &url).await?,
            CliCommand::Sweep { retention_secs } => run_sweep(&cfg, retention_secs)?,
        }

        Ok(())
    }
}
