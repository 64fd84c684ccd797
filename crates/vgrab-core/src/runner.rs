//! Extraction runner: cancellable, timeout-bounded external tool invocations.
//!
//! Launches the extractor (and, for the split strategy, the merge tool) as a
//! child process with a hard wall-clock deadline. On deadline expiry the
//! child is force-killed and awaited, so no zombie outlives the job. The
//! tool exiting zero without producing the expected file is a real failure
//! mode and reported as `ToolFailure`, not assumed away.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::platform::{self, ExtractionProfile};
use crate::store::ArtifactStore;

/// Diagnostic detail used when the tool exits zero with no artifact on disk.
pub const ARTIFACT_MISSING: &str = "tool exited 0 but no artifact was produced";

/// How many diagnostic bytes of tool output are kept for the log.
const DIAG_TAIL_BYTES: usize = 2048;

/// Result of one extraction attempt.
#[derive(Debug)]
pub enum RunOutcome {
    /// The artifact is on disk at this path.
    Success(PathBuf),
    /// Tool exited nonzero, or zero with no artifact.
    ToolFailure { exit_code: Option<i32>, detail: String },
    /// The wall-clock deadline expired; the child was killed and awaited.
    Timeout,
    /// The tool could not be started at all.
    LaunchError(std::io::Error),
}

/// Completion of a single child process.
enum StepExit {
    Exited {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    TimedOut,
    Launch(std::io::Error),
}

/// Runs external tool invocations for the orchestrator.
#[derive(Debug, Clone)]
pub struct ExtractionRunner {
    extractor_bin: String,
    merge_bin: String,
    timeout: Duration,
    split_merge: bool,
}

impl ExtractionRunner {
    pub fn new(
        extractor_bin: impl Into<String>,
        merge_bin: impl Into<String>,
        timeout: Duration,
        split_merge: bool,
    ) -> Self {
        Self {
            extractor_bin: extractor_bin.into(),
            merge_bin: merge_bin.into(),
            timeout,
            split_merge,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the full extraction for one job. The artifact (if any) lands in
    /// `store` under the job-id prefix.
    pub async fn run(
        &self,
        store: &ArtifactStore,
        job_id: &str,
        url: &str,
        profile: &ExtractionProfile,
    ) -> RunOutcome {
        if self.split_merge {
            self.run_split(store, job_id, url, profile).await
        } else {
            self.run_combined(store, job_id, url, profile).await
        }
    }

    /// Metadata-only duration probe, in whole seconds. `Ok(None)` means the
    /// tool did not report a duration (e.g. live stream); probe failures are
    /// the caller's to downgrade.
    pub async fn probe_duration(
        &self,
        url: &str,
        profile: &ExtractionProfile,
    ) -> Result<Option<u64>, RunOutcome> {
        let args = profile.probe_args(url);
        match self.run_step(&self.extractor_bin, &args).await {
            StepExit::Exited { status, stdout, .. } if status.success() => {
                Ok(stdout.trim().parse::<f64>().ok().map(|d| d.ceil() as u64))
            }
            StepExit::Exited { status, stderr, .. } => Err(RunOutcome::ToolFailure {
                exit_code: status.code(),
                detail: format!("duration probe failed: {}", tail(&stderr)),
            }),
            StepExit::TimedOut => Err(RunOutcome::Timeout),
            StepExit::Launch(e) => Err(RunOutcome::LaunchError(e)),
        }
    }

    /// Single-invocation strategy: the extractor downloads and merges itself.
    async fn run_combined(
        &self,
        store: &ArtifactStore,
        job_id: &str,
        url: &str,
        profile: &ExtractionProfile,
    ) -> RunOutcome {
        let template = store.output_template(job_id, None);
        let args = profile.download_args(url, &template);
        match self.run_step(&self.extractor_bin, &args).await {
            StepExit::Exited { status, stdout, stderr } => {
                if !status.success() {
                    return RunOutcome::ToolFailure {
                        exit_code: status.code(),
                        detail: format!("stdout: {} / stderr: {}", tail(&stdout), tail(&stderr)),
                    };
                }
                match store.locate(job_id, profile.container) {
                    Some(path) => RunOutcome::Success(path),
                    None => RunOutcome::ToolFailure {
                        exit_code: status.code(),
                        detail: ARTIFACT_MISSING.to_string(),
                    },
                }
            }
            StepExit::TimedOut => RunOutcome::Timeout,
            StepExit::Launch(e) => RunOutcome::LaunchError(e),
        }
    }

    /// Split strategy: video-only and audio-only downloads, then an explicit
    /// merge. Each step has its own deadline; the first failure aborts the
    /// job without running later steps.
    async fn run_split(
        &self,
        store: &ArtifactStore,
        job_id: &str,
        url: &str,
        profile: &ExtractionProfile,
    ) -> RunOutcome {
        let video_prefix = format!("{}.video", job_id);
        let audio_prefix = format!("{}.audio", job_id);

        for (selector, tag, prefix) in [
            ("bv*", "video", &video_prefix),
            ("ba", "audio", &audio_prefix),
        ] {
            let template = store.output_template(job_id, Some(tag));
            let args = profile.stream_args(selector, url, &template);
            match self.run_step(&self.extractor_bin, &args).await {
                StepExit::Exited { status, stderr, .. } if !status.success() => {
                    return RunOutcome::ToolFailure {
                        exit_code: status.code(),
                        detail: format!("{} download failed: {}", tag, tail(&stderr)),
                    };
                }
                StepExit::Exited { status, .. } => {
                    if store.locate_stream(prefix).is_none() {
                        return RunOutcome::ToolFailure {
                            exit_code: status.code(),
                            detail: format!("{} step: {}", tag, ARTIFACT_MISSING),
                        };
                    }
                }
                StepExit::TimedOut => return RunOutcome::Timeout,
                StepExit::Launch(e) => return RunOutcome::LaunchError(e),
            }
        }

        // Both streams are on disk; locate_stream() just verified them.
        let video = store.locate_stream(&video_prefix).expect("video stream located");
        let audio = store.locate_stream(&audio_prefix).expect("audio stream located");
        let output = store.dir().join(format!("{}.{}", job_id, profile.container));
        let args = platform::merge_args(&video, &audio, &output);

        let outcome = match self.run_step(&self.merge_bin, &args).await {
            StepExit::Exited { status, stderr, .. } if !status.success() => {
                RunOutcome::ToolFailure {
                    exit_code: status.code(),
                    detail: format!("merge failed: {}", tail(&stderr)),
                }
            }
            StepExit::Exited { .. } => {
                if output.exists() {
                    RunOutcome::Success(output.clone())
                } else {
                    RunOutcome::ToolFailure {
                        exit_code: Some(0),
                        detail: format!("merge step: {}", ARTIFACT_MISSING),
                    }
                }
            }
            StepExit::TimedOut => RunOutcome::Timeout,
            StepExit::Launch(e) => RunOutcome::LaunchError(e),
        };

        // Intermediates are never handed off.
        store.delete(&video);
        store.delete(&audio);
        outcome
    }

    /// Spawn one child with piped output and a hard deadline. Output is
    /// drained concurrently so a chatty tool cannot fill the pipe and stall.
    async fn run_step(&self, bin: &str, args: &[String]) -> StepExit {
        tracing::debug!("running {} {}", bin, args.join(" "));
        let mut child = match Command::new(bin)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(c) => c,
            Err(e) => return StepExit::Launch(e),
        };

        let stdout_task = drain(child.stdout.take());
        let stderr_task = drain(child.stderr.take());

        match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => {
                let stdout = stdout_task.await.unwrap_or_default();
                let stderr = stderr_task.await.unwrap_or_default();
                StepExit::Exited { status, stdout, stderr }
            }
            Ok(Err(e)) => StepExit::Launch(e),
            Err(_) => {
                // Deadline expired: kill and await the exit so the child is
                // reaped before the admission slot is released.
                if let Err(e) = child.start_kill() {
                    tracing::warn!("could not kill timed-out {}: {}", bin, e);
                }
                let _ = child.wait().await;
                stdout_task.abort();
                stderr_task.abort();
                StepExit::TimedOut
            }
        }
    }
}

/// Read a child output stream to completion on its own task.
fn drain(
    stream: Option<impl tokio::io::AsyncRead + Unpin + Send + 'static>,
) -> tokio::task::JoinHandle<String> {
    tokio::spawn(async move {
        let mut buf = String::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_string(&mut buf).await;
        }
        buf
    })
}

/// Last `DIAG_TAIL_BYTES` of tool output, for the log.
fn tail(s: &str) -> &str {
    let trimmed = s.trim();
    if trimmed.len() <= DIAG_TAIL_BYTES {
        return trimmed;
    }
    let mut start = trimmed.len() - DIAG_TAIL_BYTES;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    &trimmed[start..]
}
