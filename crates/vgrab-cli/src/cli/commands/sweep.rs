//! `vgrab sweep` – one cleanup pass over the artifact directory.

use anyhow::Result;
use std::time::Duration;
use vgrab_core::config::VgrabConfig;
use vgrab_core::sweeper;

pub fn run_sweep(cfg: &VgrabConfig, retention_secs: Option<u64>) -> Result<()> {
    let dir = cfg.download_dir()?;
    let retention = retention_secs.map(Duration::from_secs).unwrap_or_else(|| cfg.retention());
    let removed = sweeper::sweep_once(&dir, retention);
    println!("removed {} stale file(s) from {}", removed, dir.display());
    Ok(())
}
