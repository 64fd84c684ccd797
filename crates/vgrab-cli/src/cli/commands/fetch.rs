//! `vgrab fetch` – run one URL through the full orchestrator pipeline.

use anyhow::{anyhow, Result};
use std::path::Path;
use vgrab_core::config::VgrabConfig;
use vgrab_core::coordinator::Coordinator;
use vgrab_core::session::UserId;
use vgrab_core::sweeper;

use crate::cli::console::ConsoleTransport;

/// The console user; there is only one submitter in CLI mode.
const CLI_USER: UserId = UserId(0);

pub async fn run_fetch(cfg: &VgrabConfig, url: &str, output_dir: &Path) -> Result<()> {
    let coordinator = Coordinator::new(cfg)?;

    // Backstop for artifacts left by prior crashed runs; the first tick
    // fires immediately.
    let sweep = sweeper::spawn(
        coordinator.store().clone(),
        cfg.sweep_interval(),
        cfg.retention(),
    );

    let transport = ConsoleTransport::new(output_dir);
    let result = coordinator.handle_link(CLI_USER, url, &transport).await;
    sweep.abort();

    result.map_err(|e| anyhow!("download failed: {}", e))
}
