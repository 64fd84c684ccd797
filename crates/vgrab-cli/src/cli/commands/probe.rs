//! `vgrab probe` – metadata-only duration check for a URL.

use anyhow::{anyhow, Result};
use vgrab_core::config::VgrabConfig;
use vgrab_core::platform::Platform;
use vgrab_core::runner::ExtractionRunner;

pub async fn run_probe(cfg: &VgrabConfig, url: &str) -> Result<()> {
    let runner = ExtractionRunner::new(
        cfg.extractor_bin.clone(),
        cfg.merge_bin.clone(),
        cfg.job_timeout(),
        cfg.split_merge,
    );
    let profile = Platform::classify(url).profile();

    match runner.probe_duration(url, &profile).await {
        Ok(Some(secs)) => {
            println!("{}", secs);
            Ok(())
        }
        Ok(None) => {
            println!("unknown");
            Ok(())
        }
        Err(outcome) => Err(anyhow!("probe failed: {:?}", outcome)),
    }
}
