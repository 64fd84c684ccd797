use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

fn default_extractor_bin() -> String {
    "yt-dlp".to_string()
}

fn default_merge_bin() -> String {
    "ffmpeg".to_string()
}

/// Global configuration loaded from `~/.config/vgrab/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VgrabConfig {
    /// Maximum number of extraction jobs running at once (admission slots).
    pub max_concurrent_jobs: usize,
    /// Hard wall-clock timeout per external-tool invocation, in seconds.
    pub job_timeout_secs: u64,
    /// Maximum artifact size accepted for handoff, in bytes. An artifact of
    /// exactly this size is accepted; one byte over is rejected.
    pub max_artifact_bytes: u64,
    /// Optional media duration ceiling in seconds. When set, a metadata-only
    /// probe runs before the full download and rejects longer media.
    /// None disables the pre-check.
    #[serde(default)]
    pub max_duration_secs: Option<u64>,
    /// Age after which the cleanup sweeper deletes files from the download dir.
    pub retention_secs: u64,
    /// Interval between cleanup sweeps.
    pub sweep_interval_secs: u64,
    /// Directory for in-flight and completed artifacts. Defaults to
    /// `~/.local/state/vgrab/downloads` when unset.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// External extraction tool (must accept yt-dlp style arguments).
    #[serde(default = "default_extractor_bin")]
    pub extractor_bin: String,
    /// External merge tool used by the split download strategy.
    #[serde(default = "default_merge_bin")]
    pub merge_bin: String,
    /// When true, video and audio are downloaded as two separate extractor
    /// invocations and merged with `merge_bin` instead of a single combined
    /// download.
    #[serde(default)]
    pub split_merge: bool,
}

impl Default for VgrabConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 2,
            job_timeout_secs: 600,
            max_artifact_bytes: 48 * 1024 * 1024,
            max_duration_secs: None,
            retention_secs: 3600,
            sweep_interval_secs: 1800,
            download_dir: None,
            extractor_bin: default_extractor_bin(),
            merge_bin: default_merge_bin(),
            split_merge: false,
        }
    }
}

impl VgrabConfig {
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Resolve the artifact directory: the configured one, or the default
    /// under the XDG state dir.
    pub fn download_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.download_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("vgrab")?;
        Ok(xdg_dirs.get_state_home().join("downloads"))
    }
}

/// Chat credential token, env-only so it never lands in the config file.
pub fn bot_token() -> Option<String> {
    std::env::var("VGRAB_BOT_TOKEN").ok().filter(|t| !t.is_empty())
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vgrab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VgrabConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VgrabConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: VgrabConfig = toml::from_str(&data)?;
    Ok(cfg)
}
